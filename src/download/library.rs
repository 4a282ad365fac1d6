//! Media library registration for saved downloads

use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A file known to the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub path: PathBuf,
}

/// A named group of assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub path: PathBuf,
}

/// The device photo/document library
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Register a local file as a new asset
    async fn create_asset(&self, file: &Path) -> Result<Asset, Error>;

    /// Look an album up by name
    async fn get_album(&self, name: &str) -> Result<Option<Album>, Error>;

    /// Append assets to an existing album
    async fn add_assets_to_album(&self, assets: &[Asset], album: &Album) -> Result<(), Error>;

    /// Create an album holding a first asset
    async fn create_album(&self, name: &str, asset: &Asset) -> Result<Album, Error>;
}

/// Library laid out on disk: assets under `<root>/assets`, one
/// sub-directory per album.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn album_path(&self, name: &str) -> Result<PathBuf, Error> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "assets" || name.starts_with('.') {
            return Err(Error::library(format!("Invalid album name: {:?}", name)));
        }
        Ok(self.root.join(name))
    }

    async fn copy_into(&self, source: &Path, dir: &Path) -> Result<PathBuf, Error> {
        tokio::fs::create_dir_all(dir).await?;
        let file_name = source
            .file_name()
            .ok_or_else(|| Error::library(format!("Not a file: {}", source.display())))?;
        let target = unique_path(&dir.join(file_name)).await;
        tokio::fs::copy(source, &target).await?;
        Ok(target)
    }
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
async fn unique_path(candidate: &Path) -> PathBuf {
    if !tokio::fs::try_exists(candidate).await.unwrap_or(false) {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let next = candidate.with_file_name(format!("{} ({}){}", stem, n, ext));
        if !tokio::fs::try_exists(&next).await.unwrap_or(false) {
            return next;
        }
        n += 1;
    }
}

#[async_trait]
impl MediaLibrary for DirectoryLibrary {
    async fn create_asset(&self, file: &Path) -> Result<Asset, Error> {
        let path = self.copy_into(file, &self.root.join("assets")).await?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        debug!("Created asset {}", id);
        Ok(Asset { id, path })
    }

    async fn get_album(&self, name: &str) -> Result<Option<Album>, Error> {
        let path = self.album_path(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(Album {
                name: name.to_string(),
                path,
            })),
            Ok(_) => Err(Error::library(format!("{} is not an album", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn add_assets_to_album(&self, assets: &[Asset], album: &Album) -> Result<(), Error> {
        for asset in assets {
            self.copy_into(&asset.path, &album.path).await?;
        }
        Ok(())
    }

    async fn create_album(&self, name: &str, asset: &Asset) -> Result<Album, Error> {
        let album = Album {
            name: name.to_string(),
            path: self.album_path(name)?,
        };
        tokio::fs::create_dir_all(&album.path).await?;
        self.add_assets_to_album(std::slice::from_ref(asset), &album).await?;
        debug!("Created album {}", name);
        Ok(album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_album_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("devoir.pdf");
        tokio::fs::write(&source, b"%PDF").await.unwrap();

        let library = DirectoryLibrary::new(dir.path().join("library"));
        assert!(library.get_album("Download").await.unwrap().is_none());

        let asset = library.create_asset(&source).await.unwrap();
        let album = library.create_album("Download", &asset).await.unwrap();
        assert!(album.path.join("devoir.pdf").exists());

        // Same file again: kept twice, no overwrite.
        let again = library.create_asset(&source).await.unwrap();
        assert_ne!(again.id, asset.id);
        let found = library.get_album("Download").await.unwrap().unwrap();
        library.add_assets_to_album(&[again], &found).await.unwrap();
        assert!(album.path.join("devoir (1).pdf").exists());
    }

    #[tokio::test]
    async fn test_rejects_bad_album_names() {
        let dir = tempfile::tempdir().unwrap();
        let library = DirectoryLibrary::new(dir.path());
        assert!(library.get_album("../etc").await.is_err());
        assert!(library.get_album("").await.is_err());
    }
}
