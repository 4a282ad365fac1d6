//! Durable storage for the session token and role

use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::session::AuthSession;
use crate::error::Error;

/// Key-value persistence for the current [`AuthSession`]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> Result<Option<AuthSession>, Error>;

    /// Replace the stored session
    async fn save(&self, session: &AuthSession) -> Result<(), Error>;

    /// Forget the stored session
    async fn clear(&self) -> Result<(), Error>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    session: RwLock<Option<AuthSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<AuthSession>, Error> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    async fn save(&self, session: &AuthSession) -> Result<(), Error> {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

/// JSON file store: `{ "token": "...", "role": "..." }`
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn load(&self) -> Result<Option<AuthSession>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write then rename; readers never see a partial file.
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(session)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("credentials.json"));

        assert!(store.load().await.unwrap().is_none());

        let session = AuthSession::new("t1", "eleve");
        store.save(&session).await.unwrap();

        // A second handle on the same file sees the data, as after a restart.
        let reopened = FileStore::new(store.path().to_path_buf());
        let loaded = reopened.load().await.unwrap().unwrap();
        assert_eq!(loaded.token, "t1");
        assert_eq!(loaded.role, Role::Eleve);

        reopened.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        reopened.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_keeps_unknown_role() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));

        store
            .save(&AuthSession::new("t2", "surveillant"))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::Other("surveillant".to_string()));
    }

    #[test]
    fn test_memory_store() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.save(&AuthSession::new("t3", "parent")).await.unwrap();
            assert_eq!(store.load().await.unwrap().unwrap().token, "t3");
            store.clear().await.unwrap();
            assert!(store.load().await.unwrap().is_none());
        });
    }
}
