//! Fetch-and-replace record lists (homework directory, submission history)

mod types;

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// A record type served as a JSON array by a listing endpoint
pub trait Listing: DeserializeOwned + Clone + Send + Sync + 'static {
    /// API path of the listing
    const PATH: &'static str;

    /// Whether the request must carry a bearer token
    const REQUIRES_AUTH: bool;
}

#[derive(Debug)]
struct DirectoryState<R> {
    records: Vec<R>,
    loading: bool,
}

/// Clears the loading flag however the refresh ends
struct LoadingGuard<'a, R> {
    state: &'a RwLock<DirectoryState<R>>,
}

impl<R> Drop for LoadingGuard<'_, R> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.loading = false;
    }
}

/// Server-owned list of records.
///
/// `refresh` swaps the whole collection on success and leaves it untouched on
/// failure. There is no merge, paging or cache.
pub struct Directory<R: Listing> {
    client: Client,
    auth: Arc<Auth>,
    options: ClientOptions,
    cancel: CancellationToken,
    state: RwLock<DirectoryState<R>>,
}

/// Homework published for the student
pub type HomeworkDirectory = Directory<HomeworkRecord>;

/// Past submissions
pub type SubmissionHistory = Directory<SubmissionRecord>;

impl<R: Listing> Directory<R> {
    /// Create an empty directory
    pub fn new(client: Client, auth: Arc<Auth>, options: ClientOptions) -> Self {
        Self {
            client,
            auth,
            options,
            cancel: CancellationToken::new(),
            state: RwLock::new(DirectoryState {
                records: Vec::new(),
                loading: false,
            }),
        }
    }

    /// Tie pending refreshes to a screen lifetime
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Snapshot of the records, in server order
    pub fn current(&self) -> Vec<R> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.records.clone()
    }

    /// True while a refresh is pending
    pub fn is_loading(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.loading
    }

    /// Reload the whole list. Returns the number of records now held.
    pub async fn refresh(&self) -> Result<usize, Error> {
        let _guard = self.begin();

        let token = self.auth.token().await?;
        if R::REQUIRES_AUTH && token.is_none() {
            return Err(Error::MissingSession);
        }

        let url = self.options.endpoint(R::PATH);
        let request = Fetch::get(&self.client, &url)
            .client_info()
            .maybe_bearer_auth(token.as_deref());

        let records = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Refresh of {} cancelled", R::PATH);
                return Err(Error::Cancelled);
            }
            result = request.execute::<Vec<R>>() => result.map_err(|e| {
                warn!("Failed to load {}: {}", R::PATH, e);
                e
            })?,
        };

        // The owner may have gone away while the body was being read.
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let count = records.len();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.records = records;
        debug!("Loaded {} records from {}", count, R::PATH);
        Ok(count)
    }

    fn begin(&self) -> LoadingGuard<'_, R> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.loading = true;
        LoadingGuard { state: &self.state }
    }
}
