//! Submission history with view and download actions

use log::error;
use std::sync::Arc;

use super::{run_download, DownloadMessages, ScreenScope};
use crate::alert::{Alert, Notifier};
use crate::directory::{SubmissionHistory, SubmissionRecord};
use crate::download::{DownloadOutcome, DownloadStrategy};
use crate::error::Error;
use crate::Evalya;

const MESSAGES: DownloadMessages = DownloadMessages {
    browser_title: "Téléchargement lancé",
    browser_message: "Le fichier est en cours de téléchargement.",
    saved_title: "Téléchargement réussi",
    saved_message: "Le fichier a été enregistré dans le dossier \"Download\".",
    permission_message: "Impossible de sauvegarder le fichier sans autorisation.",
    failure_message: "Échec du téléchargement du fichier. Vérifiez l'URL et le type du fichier.",
};

pub struct SubmissionHistoryScreen {
    scope: ScreenScope,
    history: SubmissionHistory,
    downloads: Arc<dyn DownloadStrategy>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionHistoryScreen {
    pub fn new(evalya: &Evalya, downloads: Arc<dyn DownloadStrategy>, notifier: Arc<dyn Notifier>) -> Self {
        let scope = ScreenScope::new();
        let history = evalya.submission_history().with_cancellation(scope.child());
        Self {
            scope,
            history,
            downloads,
            notifier,
        }
    }

    /// Reload the history. False when it could not be refreshed.
    pub async fn load(&self) -> bool {
        match self.history.refresh().await {
            Ok(_) => true,
            Err(Error::Cancelled) => false,
            Err(e) => {
                error!("Failed to load submission history: {}", e);
                self.notifier.notify(Alert::error(
                    "Erreur",
                    "Erreur lors du chargement de l'historique.",
                ));
                false
            }
        }
    }

    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.history.current()
    }

    pub fn is_loading(&self) -> bool {
        self.history.is_loading()
    }

    /// Eye button: the submission to display
    pub fn view(&self, id: &str) -> Option<SubmissionRecord> {
        self.submissions().into_iter().find(|s| s.id == id)
    }

    pub async fn download(&self, submission: &SubmissionRecord) -> Option<DownloadOutcome> {
        run_download(
            &self.scope,
            &self.downloads,
            &self.notifier,
            &submission.file_url,
            &submission.file_name,
            &MESSAGES,
        )
        .await
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
