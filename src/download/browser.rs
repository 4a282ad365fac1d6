//! Browser-side downloads through a synthesized anchor click

use async_trait::async_trait;
use log::info;
use std::sync::{Arc, Mutex};

use super::{normalize_file_name, DownloadOutcome, DownloadStrategy};
use crate::error::Error;

/// `<a href=.. download=..>` as clicked in the current tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorLink {
    pub href: String,
    pub download: String,
}

/// Whatever actually performs the click (DOM bridge, webview, test double)
pub trait LinkOpener: Send + Sync {
    fn open(&self, link: &AnchorLink) -> Result<(), Error>;
}

/// Logs the link instead of clicking it
#[derive(Debug, Default)]
pub struct LoggingOpener;

impl LinkOpener for LoggingOpener {
    fn open(&self, link: &AnchorLink) -> Result<(), Error> {
        info!("Download link: {} -> {}", link.href, link.download);
        Ok(())
    }
}

/// Keeps every opened link
#[derive(Debug, Default)]
pub struct RecordingOpener {
    links: Mutex<Vec<AnchorLink>>,
}

impl RecordingOpener {
    pub fn links(&self) -> Vec<AnchorLink> {
        self.links.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, link: &AnchorLink) -> Result<(), Error> {
        self.links
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(link.clone());
        Ok(())
    }
}

/// Hands the URL to the browser; the client never sees the bytes
pub struct BrowserTrigger {
    opener: Arc<dyn LinkOpener>,
}

impl BrowserTrigger {
    pub fn new(opener: Arc<dyn LinkOpener>) -> Self {
        Self { opener }
    }
}

#[async_trait]
impl DownloadStrategy for BrowserTrigger {
    async fn download(&self, url: &str, file_name: &str) -> Result<DownloadOutcome, Error> {
        let link = AnchorLink {
            href: url.to_string(),
            download: normalize_file_name(file_name),
        };
        self.opener.open(&link)?;
        Ok(DownloadOutcome::Triggered(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anchor_gets_pdf_suffix() {
        let opener = Arc::new(RecordingOpener::default());
        let strategy = BrowserTrigger::new(opener.clone());

        let outcome = strategy
            .download("https://s3.example/report", "report")
            .await
            .unwrap();

        let expected = AnchorLink {
            href: "https://s3.example/report".to_string(),
            download: "report.pdf".to_string(),
        };
        assert_eq!(outcome, DownloadOutcome::Triggered(expected.clone()));
        assert_eq!(opener.links(), vec![expected]);
    }
}
