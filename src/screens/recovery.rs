//! Password recovery form

use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::BusyGuard;
use crate::auth::Auth;
use crate::error::Error;

/// Shown when the backend accepted the request
pub const RECOVERY_SENT: &str = "Un nouveau mot de passe a été envoyé à votre adresse email.";

/// Inline message for a failed recovery request
pub fn recovery_error_message(err: &Error) -> String {
    if let Error::Validation(msg) = err {
        return msg.clone();
    }
    if err.is_network() {
        return "Aucune réponse du serveur. Vérifiez votre connexion internet.".to_string();
    }

    let server_message = err.server_message();
    match err.status() {
        Some(404) => "Adresse email non trouvée.".to_string(),
        Some(400) => server_message.unwrap_or_else(|| "Requête invalide.".to_string()),
        Some(status) => format!(
            "Erreur {} : {}",
            status,
            server_message.unwrap_or_else(|| "Une erreur s’est produite.".to_string())
        ),
        None => "Erreur lors de la réinitialisation du mot de passe.".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RecoveryState {
    message: Option<String>,
    error: Option<String>,
}

pub struct PasswordRecoveryScreen {
    auth: Arc<Auth>,
    loading: AtomicBool,
    state: RwLock<RecoveryState>,
}

impl PasswordRecoveryScreen {
    pub fn new(auth: Arc<Auth>) -> Self {
        Self {
            auth,
            loading: AtomicBool::new(false),
            state: RwLock::new(RecoveryState::default()),
        }
    }

    /// Request a new password; true when the email was sent
    pub async fn submit(&self, email: &str) -> bool {
        let Some(busy) = BusyGuard::acquire(&self.loading) else {
            return false;
        };
        self.set(RecoveryState::default());

        let result = self.auth.forget_password(email).await;
        drop(busy);

        match result {
            Ok(200) => {
                self.set(RecoveryState {
                    message: Some(RECOVERY_SENT.to_string()),
                    error: None,
                });
                true
            }
            Ok(status) => {
                self.set(RecoveryState {
                    message: None,
                    error: Some(format!("Erreur inattendue (statut : {})", status)),
                });
                false
            }
            Err(e) => {
                if !matches!(e, Error::Validation(_)) {
                    error!("Password recovery failed: {}", e);
                }
                self.set(RecoveryState {
                    message: None,
                    error: Some(recovery_error_message(&e)),
                });
                false
            }
        }
    }

    pub fn message(&self) -> Option<String> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).message.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn set(&self, value: RecoveryState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = value;
    }
}
