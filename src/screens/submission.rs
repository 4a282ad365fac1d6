//! Hand in a file for one homework

use log::{debug, error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::ScreenScope;
use crate::alert::{Alert, Notifier};
use crate::directory::HomeworkRecord;
use crate::error::Error;
use crate::storage::{FileChooser, FilePicker, PickOutcome, SelectedFile, UploadReceipt, Uploader};
use crate::Evalya;

/// Alert text for an upload failure
pub fn upload_error_message(err: &Error) -> String {
    match err {
        Error::NoFileSelected => "Aucun fichier sélectionné".to_string(),
        Error::Upload { body, .. } => format!("Échec de l'upload: {}", body),
        Error::Api { message, .. } if !message.is_empty() => message.clone(),
        Error::Api { .. } => "Échec du téléchargement".to_string(),
        other => other.to_string(),
    }
}

pub struct SubmissionScreen<C: FileChooser> {
    scope: ScreenScope,
    picker: FilePicker<C>,
    uploader: Uploader,
    notifier: Arc<dyn Notifier>,
    homework: Option<HomeworkRecord>,
    success_visible: AtomicBool,
}

impl<C: FileChooser> SubmissionScreen<C> {
    pub fn new(evalya: &Evalya, chooser: C, notifier: Arc<dyn Notifier>) -> Self {
        let scope = ScreenScope::new();
        let uploader = evalya.uploader().with_cancellation(scope.child());
        Self {
            scope,
            picker: FilePicker::new(chooser),
            uploader,
            notifier,
            homework: None,
            success_visible: AtomicBool::new(false),
        }
    }

    /// Open the screen for a given homework
    pub fn for_homework(mut self, homework: HomeworkRecord) -> Self {
        self.homework = Some(homework);
        self
    }

    pub fn homework(&self) -> Option<&HomeworkRecord> {
        self.homework.as_ref()
    }

    /// "Choisir un fichier" button
    pub async fn pick_file(&self) -> Option<SelectedFile> {
        match self.picker.pick_file().await {
            Ok(PickOutcome::Selected(file)) => Some(file),
            Ok(PickOutcome::Canceled) => None,
            Err(Error::Validation(reason)) => {
                debug!("File rejected: {}", reason);
                self.notifier
                    .notify(Alert::error("Erreur", "Fichier non valide ou trop lourd"));
                None
            }
            Err(e) => {
                error!("File selection failed: {}", e);
                self.notifier
                    .notify(Alert::error("Erreur", "Échec de la sélection du fichier"));
                None
            }
        }
    }

    pub fn selected(&self) -> Option<SelectedFile> {
        self.picker.selected()
    }

    /// "Envoyer" button
    pub async fn submit(&self) -> Option<UploadReceipt> {
        let selected = self.picker.selected();
        match self.uploader.submit(selected.as_ref()).await {
            Ok(receipt) => {
                self.notifier
                    .notify(Alert::success("Succès", "Fichier uploadé avec succès !"));
                self.success_visible.store(true, Ordering::Release);
                self.picker.clear();
                Some(receipt)
            }
            Err(Error::UploadInProgress) => {
                debug!("Upload already running, ignoring submit");
                None
            }
            Err(Error::Cancelled) => None,
            Err(e) => {
                if !matches!(e, Error::NoFileSelected) {
                    error!("Upload failed: {}", e);
                }
                self.notifier
                    .notify(Alert::error("Erreur", upload_error_message(&e)));
                None
            }
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploader.is_pending()
    }

    /// The success overlay is shown until dismissed
    pub fn success_visible(&self) -> bool {
        self.success_visible.load(Ordering::Acquire)
    }

    pub fn dismiss_success(&self) {
        self.success_visible.store(false, Ordering::Release);
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
