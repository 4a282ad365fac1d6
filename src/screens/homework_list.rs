//! Homework list with per-row download

use log::error;
use std::sync::Arc;

use super::{run_download, DownloadMessages, ScreenScope};
use crate::alert::{Alert, Notifier};
use crate::directory::{HomeworkDirectory, HomeworkRecord};
use crate::download::{DownloadOutcome, DownloadStrategy};
use crate::error::Error;
use crate::Evalya;

const MESSAGES: DownloadMessages = DownloadMessages {
    browser_title: "Succès",
    browser_message: "Téléchargement lancé.",
    saved_title: "Succès",
    saved_message: "Fichier téléchargé dans \"Download\".",
    permission_message: "Impossible de sauvegarder sans autorisation.",
    failure_message: "Téléchargement échoué.",
};

pub struct HomeworkListScreen {
    scope: ScreenScope,
    directory: HomeworkDirectory,
    downloads: Arc<dyn DownloadStrategy>,
    notifier: Arc<dyn Notifier>,
}

impl HomeworkListScreen {
    /// Mount the screen; call [`load`](Self::load) right after
    pub fn new(evalya: &Evalya, downloads: Arc<dyn DownloadStrategy>, notifier: Arc<dyn Notifier>) -> Self {
        let scope = ScreenScope::new();
        let directory = evalya.homework_directory().with_cancellation(scope.child());
        Self {
            scope,
            directory,
            downloads,
            notifier,
        }
    }

    /// Full reload of the list. False when the list could not be refreshed.
    pub async fn load(&self) -> bool {
        match self.directory.refresh().await {
            Ok(_) => true,
            Err(Error::Cancelled) => false,
            Err(Error::MissingSession) => {
                self.notifier.notify(Alert::error(
                    "Erreur",
                    "Aucun token trouvé. Veuillez vous reconnecter.",
                ));
                false
            }
            Err(e) => {
                error!("Erreur lors du chargement des devoirs: {}", e);
                self.notifier
                    .notify(Alert::error("Erreur", "Impossible de charger les devoirs."));
                false
            }
        }
    }

    pub fn homeworks(&self) -> Vec<HomeworkRecord> {
        self.directory.current()
    }

    pub fn is_loading(&self) -> bool {
        self.directory.is_loading()
    }

    /// Download button of a row
    pub async fn download(&self, homework: &HomeworkRecord) -> Option<DownloadOutcome> {
        run_download(
            &self.scope,
            &self.downloads,
            &self.notifier,
            &homework.file_url,
            &homework.file_name,
            &MESSAGES,
        )
        .await
    }

    /// Arrow button of a row: the homework to open the submission screen for
    pub fn open_submission(&self, id: &str) -> Option<HomeworkRecord> {
        self.homeworks().into_iter().find(|h| h.id == id)
    }

    /// Unmount: pending requests are cancelled
    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
