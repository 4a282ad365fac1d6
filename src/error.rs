//! Error handling for the Evalya Smart client

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the Evalya Smart client
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any request was made (bad email, empty fields, bad file)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local file system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File content was not valid base64
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// No token available for an authenticated request
    #[error("Missing session")]
    MissingSession,

    /// `submit` was called without a selected file
    #[error("No file selected")]
    NoFileSelected,

    /// Another upload is still pending on this uploader
    #[error("An upload is already in progress")]
    UploadInProgress,

    /// The pre-signed PUT was rejected
    #[error("Upload failed ({status}): {body}")]
    Upload { status: u16, body: String },

    /// Storage or media permission was not granted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The downloaded file is missing or empty
    #[error("Downloaded file is empty or missing: {0}")]
    EmptyDownload(String),

    /// Media library registration failed
    #[error("Library error: {0}")]
    Library(String),

    /// The owning screen was torn down while the request was pending
    #[error("Operation cancelled")]
    Cancelled,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new API error from a status code and response text
    pub fn api<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Api {
            status,
            message: msg.to_string(),
        }
    }

    /// Create a new library error
    pub fn library<T: fmt::Display>(msg: T) -> Self {
        Error::Library(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status attached to this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Upload { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request never got a response (connection refused, timeout, DNS)
    pub fn is_network(&self) -> bool {
        match self {
            Error::Http(e) => e.status().is_none() && (e.is_connect() || e.is_timeout() || e.is_request()),
            _ => false,
        }
    }

    /// Backend `message` field if the API error body was JSON carrying one
    pub fn server_message(&self) -> Option<String> {
        match self {
            Error::Api { message, .. } => serde_json::from_str::<serde_json::Value>(message)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string)),
            _ => None,
        }
    }
}
