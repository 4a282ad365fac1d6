//! Sign-in form

use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::BusyGuard;
use crate::auth::{Auth, Route};
use crate::error::Error;

/// Inline message for a failed login
pub fn login_error_message(err: &Error) -> String {
    match err {
        Error::Validation(msg) => msg.clone(),
        _ => match err.status() {
            Some(401) => "Mot de passe incorrect".to_string(),
            Some(404) => "Utilisateur introuvable".to_string(),
            _ => "Erreur de connexion au serveur".to_string(),
        },
    }
}

pub struct LoginScreen {
    auth: Arc<Auth>,
    loading: AtomicBool,
    error: RwLock<Option<String>>,
}

impl LoginScreen {
    pub fn new(auth: Arc<Auth>) -> Self {
        Self {
            auth,
            loading: AtomicBool::new(false),
            error: RwLock::new(None),
        }
    }

    /// Submit the form. Returns where to navigate on success.
    pub async fn submit(&self, email: &str, password: &str) -> Option<Route> {
        let Some(busy) = BusyGuard::acquire(&self.loading) else {
            return None;
        };
        self.set_error(None);

        let result = self.auth.login(email, password).await;
        drop(busy);

        match result {
            Ok(response) => Some(Route::from(&response.role)),
            Err(e) => {
                if !matches!(e, Error::Validation(_)) {
                    error!("Login failed: {}", e);
                }
                self.set_error(Some(login_error_message(&e)));
                None
            }
        }
    }

    /// Message shown under the form, cleared on the next edit or submit
    pub fn error(&self) -> Option<String> {
        self.error.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The user typed in a field
    pub fn on_edit(&self) {
        self.set_error(None);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn set_error(&self, value: Option<String>) {
        *self.error.write().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message(&Error::api(401, "")), "Mot de passe incorrect");
        assert_eq!(login_error_message(&Error::api(404, "")), "Utilisateur introuvable");
        assert_eq!(
            login_error_message(&Error::api(500, "boom")),
            "Erreur de connexion au serveur"
        );
        assert_eq!(
            login_error_message(&Error::validation("Veuillez remplir tous les champs")),
            "Veuillez remplir tous les champs"
        );
    }
}
