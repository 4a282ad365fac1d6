//! Homework submission through pre-signed upload URLs

mod picker;
mod types;

use log::{debug, info, warn};
use reqwest::Client;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use picker::*;
pub use types::*;

/// Releases the single-flight flag when the upload ends, however it ends
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, Error> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| PendingGuard(flag))
            .map_err(|_| Error::UploadInProgress)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends a selected file to object storage.
///
/// The backend hands out a write URL, the bytes go straight to storage with a
/// PUT. At most one upload runs at a time per uploader.
pub struct Uploader {
    client: Client,
    auth: Arc<Auth>,
    options: ClientOptions,
    pending: AtomicBool,
    cancel: CancellationToken,
}

impl Uploader {
    /// Create a new Uploader
    pub fn new(client: Client, auth: Arc<Auth>, options: ClientOptions) -> Self {
        Self {
            client,
            auth,
            options,
            pending: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Tie pending uploads to a screen lifetime
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// True while an upload is running
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Ask the backend for a write URL for this file
    pub async fn request_upload_url(&self, file: &SelectedFile) -> Result<PresignedUpload, Error> {
        let url = self.options.endpoint("/api/uploadCorrection");
        let token = self.auth.token().await?;
        let content_type = file.content_type();

        Fetch::get(&self.client, &url)
            .client_info()
            .maybe_bearer_auth(token.as_deref())
            .query("name", &file.name)
            .query("type", &content_type)
            .execute::<PresignedUpload>()
            .await
    }

    /// PUT raw bytes to a pre-signed URL
    pub async fn put_object(&self, signed_url: &str, body: Vec<u8>, content_type: &str) -> Result<(), Error> {
        let response = Fetch::put(&self.client, signed_url)
            .bytes(body, content_type)
            .execute_raw()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload { status, body });
        }
        Ok(())
    }

    /// Upload the selected file.
    ///
    /// Fails with [`Error::NoFileSelected`] before any request when `file` is
    /// `None`, and with [`Error::UploadInProgress`] while another call runs.
    pub async fn submit(&self, file: Option<&SelectedFile>) -> Result<UploadReceipt, Error> {
        let file = file.ok_or(Error::NoFileSelected)?;
        let _pending = PendingGuard::acquire(&self.pending)?;

        debug!("Requesting pre-signed URL for {}", file.name);
        let presigned = self.cancellable(self.request_upload_url(file)).await?;

        let body = self.cancellable(file.content_uri.read_bytes()).await?;
        let bytes = body.len();
        let content_type = file.content_type();

        debug!("Uploading {} bytes of {} as {}", bytes, file.name, content_type);
        if let Err(e) = self
            .cancellable(self.put_object(&presigned.url, body, &content_type))
            .await
        {
            warn!("Upload of {} failed: {}", file.name, e);
            return Err(e);
        }

        info!("Uploaded {} ({} bytes)", file.name, bytes);
        Ok(UploadReceipt {
            file_name: file.name.clone(),
            bytes,
            object_url: strip_query(&presigned.url),
        })
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

fn strip_query(signed_url: &str) -> String {
    match Url::parse(signed_url) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => signed_url.to_string(),
    }
}
