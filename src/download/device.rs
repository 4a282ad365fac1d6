//! Device-side downloads: save locally, then file under the library album

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::{normalize_file_name, DownloadOutcome, DownloadStrategy, MediaLibrary, DOWNLOAD_ALBUM};
use crate::error::Error;
use crate::fetch::Fetch;

/// Result of a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// OS-level storage/media permission prompt
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self) -> Result<PermissionStatus, Error>;
}

/// Always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub PermissionStatus);

#[async_trait]
impl PermissionGate for StaticPermission {
    async fn request(&self) -> Result<PermissionStatus, Error> {
        Ok(self.0)
    }
}

/// A download in progress, written next to its target as `<name>.part`.
///
/// Dropped before [`commit`](Self::commit), the partial file is removed, so a
/// failed or cancelled transfer never leaves a truncated file under its final name.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(target: &Path) -> Self {
        let mut path = target.as_os_str().to_owned();
        path.push(".part");
        Self {
            path: PathBuf::from(path),
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(mut self, target: &Path) -> Result<(), Error> {
        tokio::fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove partial download {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// Saves the file under `download_dir` and registers it in the "Download" album
pub struct DeviceSave {
    client: Client,
    download_dir: PathBuf,
    permissions: Arc<dyn PermissionGate>,
    library: Arc<dyn MediaLibrary>,
    cancel: CancellationToken,
}

impl DeviceSave {
    pub fn new(
        client: Client,
        download_dir: impl Into<PathBuf>,
        permissions: Arc<dyn PermissionGate>,
        library: Arc<dyn MediaLibrary>,
    ) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
            permissions,
            library,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie pending downloads to a screen lifetime
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Local path for a server-side file name; directory parts are dropped
    fn target_path(&self, file_name: &str) -> Result<PathBuf, Error> {
        let normalized = normalize_file_name(file_name);
        let base = Path::new(&normalized)
            .file_name()
            .ok_or_else(|| Error::validation(format!("Invalid file name: {:?}", file_name)))?;
        Ok(self.download_dir.join(base))
    }

    async fn fetch_to(&self, url: &str, target: &Path) -> Result<u64, Error> {
        let response = Fetch::get(&self.client, url).execute_checked().await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let partial = PartialFile::new(target);
        let mut file = tokio::fs::File::create(partial.path()).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        partial.commit(target).await?;
        Ok(written)
    }

    async fn save(&self, url: &str, file_name: &str) -> Result<DownloadOutcome, Error> {
        if self.permissions.request().await? != PermissionStatus::Granted {
            return Err(Error::PermissionDenied("media library".to_string()));
        }

        let target = self.target_path(file_name)?;
        debug!("Downloading {} to {}", url, target.display());
        let written = self.fetch_to(url, &target).await?;

        let size = match tokio::fs::metadata(&target).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        if written == 0 || size == 0 {
            // Nothing worth keeping; don't leave an empty file behind.
            let _ = tokio::fs::remove_file(&target).await;
            return Err(Error::EmptyDownload(target.display().to_string()));
        }

        let asset = self.library.create_asset(&target).await?;
        match self.library.get_album(DOWNLOAD_ALBUM).await? {
            Some(album) => {
                self.library
                    .add_assets_to_album(std::slice::from_ref(&asset), &album)
                    .await?
            }
            None => {
                self.library.create_album(DOWNLOAD_ALBUM, &asset).await?;
            }
        }

        info!("Saved {} ({} bytes) to album {}", target.display(), size, DOWNLOAD_ALBUM);
        Ok(DownloadOutcome::Saved {
            path: target,
            asset,
            album: DOWNLOAD_ALBUM.to_string(),
        })
    }
}

#[async_trait]
impl DownloadStrategy for DeviceSave {
    async fn download(&self, url: &str, file_name: &str) -> Result<DownloadOutcome, Error> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = self.save(url, file_name) => result.map_err(|e| {
                warn!("Download of {} failed: {}", url, e);
                e
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DirectoryLibrary;

    #[test]
    fn test_target_path_drops_directories() {
        let save = DeviceSave::new(
            Client::new(),
            "/data/docs",
            Arc::new(StaticPermission(PermissionStatus::Granted)),
            Arc::new(DirectoryLibrary::new("/data/lib")),
        );
        assert_eq!(
            save.target_path("../../etc/passwd").unwrap(),
            PathBuf::from("/data/docs/passwd")
        );
        assert_eq!(
            save.target_path("maths.docx").unwrap(),
            PathBuf::from("/data/docs/maths.docx")
        );
    }

    #[tokio::test]
    async fn test_uncommitted_partial_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("devoir.pdf");

        let partial = PartialFile::new(&target);
        assert_eq!(partial.path(), dir.path().join("devoir.pdf.part"));
        tokio::fs::write(partial.path(), b"%PDF-1").await.unwrap();
        drop(partial);

        assert!(!dir.path().join("devoir.pdf.part").exists());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_committed_partial_file_takes_target_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("devoir.pdf");

        let partial = PartialFile::new(&target);
        tokio::fs::write(partial.path(), b"%PDF-1.4").await.unwrap();
        partial.commit(&target).await.unwrap();

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-1.4");
        assert!(!dir.path().join("devoir.pdf.part").exists());
    }
}
