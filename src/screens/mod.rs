//! Screen controllers
//!
//! Each screen owns its state, runs the async handler behind a user action
//! and turns every failure into exactly one alert (or inline message). No
//! error escapes a screen; after a failure the screen is interactive again.

mod history;
mod homework_list;
mod login;
mod recovery;
mod submission;

use log::{debug, error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::alert::{Alert, Notifier};
use crate::download::{DownloadOutcome, DownloadStrategy};
use crate::error::Error;

pub use history::*;
pub use homework_list::*;
pub use login::*;
pub use recovery::*;
pub use submission::*;

/// Lifetime of a mounted screen.
///
/// Requests started by the screen observe child tokens of this scope;
/// tearing the scope down cancels them and their late results are dropped.
#[derive(Debug, Default)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for one operation owned by this screen
    pub fn child(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Cancel everything still pending
    pub fn teardown(&self) {
        if !self.token.is_cancelled() {
            debug!("Screen torn down, cancelling pending requests");
            self.token.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Holds a form's loading flag for one submit; the flag drops with it,
/// including when the submit future is abandoned mid-request
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    /// `None` while another submit holds the flag
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Alert texts for a list screen's download button
pub(crate) struct DownloadMessages {
    pub browser_title: &'static str,
    pub browser_message: &'static str,
    pub saved_title: &'static str,
    pub saved_message: &'static str,
    pub permission_message: &'static str,
    pub failure_message: &'static str,
}

/// Run one download and raise its single alert
pub(crate) async fn run_download(
    scope: &ScreenScope,
    strategy: &Arc<dyn DownloadStrategy>,
    notifier: &Arc<dyn Notifier>,
    url: &str,
    file_name: &str,
    messages: &DownloadMessages,
) -> Option<DownloadOutcome> {
    let cancel = scope.child();
    let result = tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = strategy.download(url, file_name) => result,
    };

    match result {
        Ok(outcome) => {
            let alert = match outcome {
                DownloadOutcome::Triggered(_) => {
                    Alert::success(messages.browser_title, messages.browser_message)
                }
                DownloadOutcome::Saved { .. } => {
                    Alert::success(messages.saved_title, messages.saved_message)
                }
            };
            notifier.notify(alert);
            Some(outcome)
        }
        Err(Error::Cancelled) => None,
        Err(Error::PermissionDenied(what)) => {
            debug!("Permission denied: {}", what);
            notifier.notify(Alert::permission_denied(messages.permission_message));
            None
        }
        Err(e) => {
            error!("Download of {} failed: {}", file_name, e);
            notifier.notify(Alert::error("Erreur", messages.failure_message));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_cancels_children() {
        let scope = ScreenScope::new();
        let child = scope.child();
        assert!(scope.is_active());
        scope.teardown();
        assert!(child.is_cancelled());
        assert!(!scope.is_active());
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_drop_cancels_children() {
        let scope = ScreenScope::new();
        let child = scope.child();
        drop(scope);
        assert!(child.is_cancelled());
    }
}
