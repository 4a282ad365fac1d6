//! Single-file selection with type and size checks

use async_trait::async_trait;
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::RwLock;

use super::types::SelectedFile;
use crate::error::Error;

/// Extensions the submission form accepts
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Largest accepted file, 50 MiB
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// What the native chooser returned
#[derive(Debug, Clone)]
pub enum ChooserResult {
    Canceled,
    Picked(SelectedFile),
}

/// A file-selection dialog. No MIME filter is applied at this level.
#[async_trait]
pub trait FileChooser: Send + Sync {
    async fn choose(&self) -> Result<ChooserResult, Error>;
}

/// Chooser backed by a path given up front (command line, drag and drop)
#[derive(Debug, Clone, Default)]
pub struct PathChooser {
    path: Option<PathBuf>,
}

impl PathChooser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A chooser the user dismissed
    pub fn canceled() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl FileChooser for PathChooser {
    async fn choose(&self) -> Result<ChooserResult, Error> {
        match &self.path {
            Some(path) => Ok(ChooserResult::Picked(SelectedFile::from_path(path).await?)),
            None => Ok(ChooserResult::Canceled),
        }
    }
}

/// Check a candidate against the extension allow-list and the size cap
pub fn validate(file: &SelectedFile) -> Result<(), Error> {
    let ext = file.extension();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::validation(format!("Unsupported file type: {:?}", ext)));
    }
    if file.size > MAX_FILE_SIZE {
        return Err(Error::validation(format!(
            "File too large: {} bytes (max {})",
            file.size, MAX_FILE_SIZE
        )));
    }
    Ok(())
}

/// Outcome of [`FilePicker::pick_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Canceled,
    Selected(SelectedFile),
}

/// Holds at most one selected file.
///
/// A rejected candidate leaves the previous selection in place.
pub struct FilePicker<C: FileChooser> {
    chooser: C,
    selection: RwLock<Option<SelectedFile>>,
}

impl<C: FileChooser> FilePicker<C> {
    pub fn new(chooser: C) -> Self {
        Self {
            chooser,
            selection: RwLock::new(None),
        }
    }

    /// Open the chooser and validate what comes back
    pub async fn pick_file(&self) -> Result<PickOutcome, Error> {
        let file = match self.chooser.choose().await? {
            ChooserResult::Canceled => {
                debug!("File selection canceled");
                return Ok(PickOutcome::Canceled);
            }
            ChooserResult::Picked(file) => file,
        };

        if let Err(e) = validate(&file) {
            warn!("Rejected {}: {}", file.name, e);
            return Err(e);
        }

        let mut selection = self.selection.write().unwrap_or_else(|e| e.into_inner());
        *selection = Some(file.clone());
        Ok(PickOutcome::Selected(file))
    }

    /// The current selection
    pub fn selected(&self) -> Option<SelectedFile> {
        let selection = self.selection.read().unwrap_or_else(|e| e.into_inner());
        selection.clone()
    }

    /// Forget the current selection
    pub fn clear(&self) {
        let mut selection = self.selection.write().unwrap_or_else(|e| e.into_inner());
        *selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ContentUri;
    use std::sync::Mutex;

    /// Hands out queued results, one per call
    struct ScriptedChooser(Mutex<Vec<ChooserResult>>);

    #[async_trait]
    impl FileChooser for ScriptedChooser {
        async fn choose(&self) -> Result<ChooserResult, Error> {
            Ok(self.0.lock().unwrap().remove(0))
        }
    }

    fn candidate(name: &str, size: u64) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            size,
            mime_type: None,
            content_uri: ContentUri::parse(&format!("/cache/{}", name)),
        }
    }

    #[test]
    fn test_validate_extensions() {
        for ok in ["a.pdf", "a.DOC", "a.docx", "a.Jpg", "a.jpeg", "a.PNG"] {
            assert!(validate(&candidate(ok, 1)).is_ok(), "{} should pass", ok);
        }
        for bad in ["a.exe", "a.txt", "pdf", "a.pdf.zip", "a."] {
            assert!(validate(&candidate(bad, 1)).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_validate_size_limit() {
        assert!(validate(&candidate("a.pdf", MAX_FILE_SIZE)).is_ok());
        assert!(validate(&candidate("a.pdf", MAX_FILE_SIZE + 1)).is_err());
        assert!(validate(&candidate("a.png", u64::MAX)).is_err());
    }

    #[tokio::test]
    async fn test_rejection_keeps_previous_selection() {
        let picker = FilePicker::new(ScriptedChooser(Mutex::new(vec![
            ChooserResult::Picked(candidate("devoir.pdf", 10)),
            ChooserResult::Picked(candidate("virus.exe", 10)),
            ChooserResult::Picked(candidate("enorme.pdf", MAX_FILE_SIZE + 1)),
            ChooserResult::Canceled,
        ])));

        assert!(matches!(picker.pick_file().await, Ok(PickOutcome::Selected(_))));
        assert!(picker.pick_file().await.is_err());
        assert!(picker.pick_file().await.is_err());
        assert_eq!(picker.pick_file().await.unwrap(), PickOutcome::Canceled);

        assert_eq!(picker.selected().unwrap().name, "devoir.pdf");
    }

    #[tokio::test]
    async fn test_rejection_with_no_prior_selection() {
        let picker = FilePicker::new(ScriptedChooser(Mutex::new(vec![ChooserResult::Picked(
            candidate("notes.txt", 10),
        )])));

        assert!(matches!(picker.pick_file().await, Err(Error::Validation(_))));
        assert!(picker.selected().is_none());
    }

    #[tokio::test]
    async fn test_path_chooser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devoir.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let picker = FilePicker::new(PathChooser::new(&path));
        let outcome = picker.pick_file().await.unwrap();
        match outcome {
            PickOutcome::Selected(file) => {
                assert_eq!(file.size, 8);
                assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
            }
            other => panic!("Expected selection, got {:?}", other),
        }

        let canceled = FilePicker::new(PathChooser::canceled());
        assert_eq!(canceled.pick_file().await.unwrap(), PickOutcome::Canceled);
    }
}
