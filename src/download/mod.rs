//! Fetching homework and submission files to the user
//!
//! How a file reaches the user depends on where the client runs: in a
//! browser the download is handed to the browser through an anchor, on a
//! device the bytes are saved locally and registered in the media library.
//! Both are [`DownloadStrategy`] implementations.

mod browser;
mod device;
mod library;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Error;

pub use browser::*;
pub use device::*;
pub use library::*;

/// Album every saved download is filed under
pub const DOWNLOAD_ALBUM: &str = "Download";

/// Runtime environment class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Browser build, downloads are delegated to the browser
    Web,
    /// Native build with local storage
    Device,
}

impl Platform {
    /// Platform of the running build
    pub fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Device
        }
    }
}

/// What a finished download produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The browser was asked to download the link
    Triggered(AnchorLink),
    /// The file was saved and registered in the library
    Saved { path: PathBuf, asset: Asset, album: String },
}

/// One way of getting a remote file to the user.
///
/// Calls are not deduplicated: downloading the same URL twice fetches twice.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    async fn download(&self, url: &str, file_name: &str) -> Result<DownloadOutcome, Error>;
}

/// Give extension-less names a `.pdf` suffix
pub fn normalize_file_name(file_name: &str) -> String {
    if file_name.contains('.') {
        file_name.to_string()
    } else {
        format!("{}.pdf", file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name("report"), "report.pdf");
        assert_eq!(normalize_file_name("report.docx"), "report.docx");
        assert_eq!(normalize_file_name("v1.2 notes"), "v1.2 notes");
    }
}
