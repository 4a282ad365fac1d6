//! Configuration options for the Evalya Smart client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Backend host the school deployment listens on
pub const DEFAULT_BASE_URL: &str = "http://192.168.1.7:5001";

/// Value sent in the `X-Client-Info` header
pub const CLIENT_INFO: &str = concat!("evalya-rust/", env!("CARGO_PKG_VERSION"));

/// Configuration options for the Evalya Smart client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the backend API
    pub base_url: String,

    /// Whether a successful login is written to the credential store
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Where the file credential store keeps the token and role
    pub credentials_path: PathBuf,

    /// Local directory downloads are saved into before library registration
    pub download_dir: PathBuf,

    /// Root of the on-disk media library
    pub library_dir: PathBuf,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let data_dir = home.join(".evalya");

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            credentials_path: data_dir.join("credentials.json"),
            download_dir: data_dir.join("documents"),
            library_dir: data_dir.join("library"),
        }
    }
}

impl ClientOptions {
    /// Build options from the environment, loading `.env` first if present.
    ///
    /// Recognised variables: `EVALYA_BASE_URL`, `EVALYA_CREDENTIALS`,
    /// `EVALYA_DOWNLOAD_DIR`, `EVALYA_LIBRARY_DIR`, `EVALYA_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let mut options = Self::default();

        if let Ok(url) = env::var("EVALYA_BASE_URL") {
            options = options.with_base_url(&url);
        }
        if let Ok(path) = env::var("EVALYA_CREDENTIALS") {
            options = options.with_credentials_path(path);
        }
        if let Ok(dir) = env::var("EVALYA_DOWNLOAD_DIR") {
            options = options.with_download_dir(dir);
        }
        if let Ok(dir) = env::var("EVALYA_LIBRARY_DIR") {
            options = options.with_library_dir(dir);
        }
        if let Ok(secs) = env::var("EVALYA_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|e| Error::general(format!("Invalid EVALYA_TIMEOUT_SECS: {}", e)))?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        url::Url::parse(&options.base_url)?;
        Ok(options)
    }

    /// Set the backend base URL; a trailing slash is dropped
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the credential file location
    pub fn with_credentials_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.credentials_path = value.into();
        self
    }

    /// Set the download directory
    pub fn with_download_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.download_dir = value.into();
        self
    }

    /// Set the media library root
    pub fn with_library_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.library_dir = value.into();
        self
    }

    /// Full URL of an API path such as `/api/login`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
