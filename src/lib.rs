//! Evalya Smart Rust Client Library
//!
//! Client for the Evalya Smart homework service: sign in, list homework and
//! past submissions, hand in a file through a pre-signed upload URL, and
//! download files to the browser or to the device.

pub mod alert;
pub mod auth;
pub mod config;
pub mod directory;
pub mod download;
pub mod error;
pub mod fetch;
pub mod screens;
pub mod storage;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::{Auth, CredentialStore, FileStore};
use crate::config::ClientOptions;
use crate::directory::{Directory, HomeworkDirectory, SubmissionHistory};
use crate::download::{
    BrowserTrigger, DeviceSave, DirectoryLibrary, DownloadStrategy, LinkOpener, LoggingOpener, MediaLibrary,
    PermissionGate, PermissionStatus, Platform, StaticPermission,
};
use crate::error::Error;
use crate::storage::Uploader;

/// The main entry point for the Evalya Smart client
pub struct Evalya {
    /// Client options
    pub options: ClientOptions,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client, shared with everything that needs the token
    auth: Arc<Auth>,
}

impl Evalya {
    /// Create a client that keeps credentials in `options.credentials_path`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use evalya_smart::{Evalya, config::ClientOptions};
    ///
    /// let evalya = Evalya::new(ClientOptions::default()).unwrap();
    /// ```
    pub fn new(options: ClientOptions) -> Result<Self, Error> {
        let store = Arc::new(FileStore::new(options.credentials_path.clone()));
        Self::with_store(options, store)
    }

    /// Create a client with a custom credential store
    pub fn with_store(options: ClientOptions, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Arc::new(Auth::new(http_client.clone(), options.clone(), store));

        Ok(Self {
            options,
            http_client,
            auth,
        })
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Arc<Auth> {
        &self.auth
    }

    /// Empty homework directory; call `refresh` to load it
    pub fn homework_directory(&self) -> HomeworkDirectory {
        Directory::new(self.http_client.clone(), self.auth.clone(), self.options.clone())
    }

    /// Empty submission history; call `refresh` to load it
    pub fn submission_history(&self) -> SubmissionHistory {
        Directory::new(self.http_client.clone(), self.auth.clone(), self.options.clone())
    }

    /// Uploader for homework files
    pub fn uploader(&self) -> Uploader {
        Uploader::new(self.http_client.clone(), self.auth.clone(), self.options.clone())
    }

    /// Device download strategy with explicit permission and library capabilities
    pub fn device_download(
        &self,
        permissions: Arc<dyn PermissionGate>,
        library: Arc<dyn MediaLibrary>,
    ) -> DeviceSave {
        DeviceSave::new(
            self.http_client.clone(),
            self.options.download_dir.clone(),
            permissions,
            library,
        )
    }

    /// Browser download strategy
    pub fn browser_download(&self, opener: Arc<dyn LinkOpener>) -> BrowserTrigger {
        BrowserTrigger::new(opener)
    }

    /// Default download strategy for a platform.
    ///
    /// Devices get a granted permission and the on-disk library under
    /// `options.library_dir`; browsers get a logging link opener.
    pub fn download_strategy(&self, platform: Platform) -> Arc<dyn DownloadStrategy> {
        match platform {
            Platform::Web => Arc::new(self.browser_download(Arc::new(LoggingOpener))),
            Platform::Device => Arc::new(self.device_download(
                Arc::new(StaticPermission(PermissionStatus::Granted)),
                Arc::new(DirectoryLibrary::new(self.options.library_dir.clone())),
            )),
        }
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::alert::{Alert, AlertKind, Notifier};
    pub use crate::auth::{AuthSession, Role, Route};
    pub use crate::config::ClientOptions;
    pub use crate::directory::{HomeworkRecord, SubmissionRecord};
    pub use crate::download::{DownloadOutcome, DownloadStrategy, Platform};
    pub use crate::error::{Error, Result};
    pub use crate::storage::{SelectedFile, UploadReceipt};
    pub use crate::Evalya;
}
