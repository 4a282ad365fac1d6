//! Types for file selection and upload

use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::Error;

/// MIME type sent when the picker could not tell
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Decoder for picker payloads: padding optional, trailing bits tolerated
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Where the selected file's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentUri {
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
    /// A file on local storage
    Local(PathBuf),
}

impl ContentUri {
    /// Interpret a picker URI: `data:` stays inline, `file://` URLs are
    /// percent-decoded, anything else is taken as a bare path
    pub fn parse(uri: &str) -> Self {
        if uri.starts_with("data:") {
            return ContentUri::DataUri(uri.to_string());
        }

        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => ContentUri::Local(path),
                Err(()) => ContentUri::Local(PathBuf::from(url.path())),
            },
            _ => ContentUri::Local(PathBuf::from(uri)),
        }
    }

    /// The base64 text of the content
    pub async fn read_base64(&self) -> Result<String, Error> {
        match self {
            ContentUri::DataUri(uri) => uri
                .split_once(',')
                .map(|(_, payload)| payload.to_string())
                .ok_or_else(|| Error::validation("Data URI has no payload")),
            ContentUri::Local(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(BASE64.encode(bytes))
            }
        }
    }

    /// The decoded binary content
    pub async fn read_bytes(&self) -> Result<Vec<u8>, Error> {
        match self {
            // Local files skip the base64 round trip.
            ContentUri::Local(path) => Ok(tokio::fs::read(path).await?),
            ContentUri::DataUri(_) => {
                let mut encoded = self.read_base64().await?;
                encoded.retain(|c| !c.is_ascii_whitespace());
                Ok(LENIENT_BASE64.decode(encoded)?)
            }
        }
    }
}

/// The file currently chosen for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub mime_type: Option<String>,
    pub content_uri: ContentUri,
}

impl SelectedFile {
    /// Lower-cased text after the last `.`, empty when there is none
    pub fn extension(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => String::new(),
        }
    }

    /// MIME type for the upload; missing or unparsable types fall back to
    /// `application/octet-stream`
    pub fn content_type(&self) -> String {
        self.mime_type
            .as_deref()
            .and_then(|m| m.parse::<mime::Mime>().ok())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)
            .to_string()
    }

    /// Describe a local file; size comes from its metadata
    pub async fn from_path(path: &Path) -> Result<Self, Error> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::validation(format!("{} is not a file", path.display())));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::validation("Path has no file name"))?;

        let mut file = Self {
            name,
            size: metadata.len(),
            mime_type: None,
            content_uri: ContentUri::Local(path.to_path_buf()),
        };
        file.mime_type = mime_for_extension(&file.extension()).map(|m| m.to_string());
        Ok(file)
    }
}

/// MIME type for the extensions the submission form accepts
pub fn mime_for_extension(ext: &str) -> Option<mime::Mime> {
    match ext {
        "pdf" => Some(mime::APPLICATION_PDF),
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "png" => Some(mime::IMAGE_PNG),
        "doc" => "application/msword".parse().ok(),
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            .parse()
            .ok(),
        _ => None,
    }
}

/// Response of `GET /api/uploadCorrection`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// The signed URL for uploading
    pub url: String,
}

/// What a finished upload reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_name: String,
    /// Bytes sent in the PUT body
    pub bytes: usize,
    /// Object location, i.e. the signed URL without its query string
    pub object_url: String,
}
