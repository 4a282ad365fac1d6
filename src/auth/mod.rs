//! Authentication and credential management

mod session;
mod store;
mod types;

use log::{debug, info};
use reqwest::Client;
use std::sync::{Arc, RwLock};

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use store::*;
pub use types::*;

/// Shape check matching `^[^\s@]+@[^\s@]+\.[^\s@]+$`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Client for the Evalya authentication endpoints
pub struct Auth {
    /// HTTP client used for requests
    client: Client,

    /// Durable token/role storage
    store: Arc<dyn CredentialStore>,

    /// The current session
    current_session: Arc<RwLock<Option<AuthSession>>>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(client: Client, options: ClientOptions, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            store,
            current_session: Arc::new(RwLock::new(None)),
            options,
        }
    }

    /// Sign in with email and password.
    ///
    /// On success the token and role are written to the credential store
    /// (unless `persist_session` is off) and cached for later requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(Error::validation("Veuillez remplir tous les champs"));
        }
        if !is_valid_email(email) {
            return Err(Error::validation("Veuillez entrer un email valide"));
        }

        let url = self.options.endpoint("/api/login");
        let response = Fetch::post(&self.client, &url)
            .client_info()
            .json(&LoginRequest { email, password })?
            .execute::<LoginResponse>()
            .await?;

        let session = AuthSession::new(response.token.clone(), response.role.clone());
        if self.options.persist_session {
            self.store.save(&session).await?;
        }
        self.set_session(session);

        info!("Logged in with role {}", response.role);
        Ok(response)
    }

    /// Ask the backend to email a new password. Returns the HTTP status.
    pub async fn forget_password(&self, email: &str) -> Result<u16, Error> {
        if email.trim().is_empty() {
            return Err(Error::validation("Veuillez entrer un email"));
        }
        if !is_valid_email(email) {
            return Err(Error::validation("Veuillez entrer un email valide"));
        }

        let url = self.options.endpoint("/api/forgetpassword");
        let response = Fetch::post(&self.client, &url)
            .client_info()
            .json(&ForgetPasswordRequest { email })?
            .execute_checked()
            .await?;

        Ok(response.status().as_u16())
    }

    /// Drop the session from memory and from the credential store
    pub async fn logout(&self) -> Result<(), Error> {
        self.store.clear().await?;
        let mut guard = self.current_session.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }

    /// Get the cached session
    pub fn get_session(&self) -> Option<AuthSession> {
        let guard = self.current_session.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Set the cached session without touching the store
    pub fn set_session(&self, session: AuthSession) {
        let mut guard = self.current_session.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session);
    }

    /// Cached session, falling back to the credential store
    pub async fn restore_session(&self) -> Result<Option<AuthSession>, Error> {
        if let Some(session) = self.get_session() {
            return Ok(Some(session));
        }

        let stored = self.store.load().await?;
        if let Some(ref session) = stored {
            debug!("Restored session from credential store");
            self.set_session(session.clone());
        }
        Ok(stored)
    }

    /// Bearer token for authenticated requests, if logged in
    pub async fn token(&self) -> Result<Option<String>, Error> {
        Ok(self.restore_session().await?.map(|s| s.token))
    }
}
