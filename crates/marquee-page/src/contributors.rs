//! Contributor count shown in the hero section.
//!
//! One request to the contributors listing runs in the background at startup.
//! A successful response shows `{count}+`; anything else shows `Many`.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::config::ContributorsConfig;
use crate::dom::{Document, NodeId};

/// Id of the element that displays the count.
pub const COUNT_ID: &str = "contributor-count";
/// Text shown when the count cannot be fetched.
pub const FALLBACK_TEXT: &str = "Many";

/// Errors that can occur while fetching contributors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Unexpected response status: {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("No async runtime available")]
    NoRuntime,
}

/// Something that can count contributors.
pub trait ContributorSource: Send + Sync + 'static {
    fn fetch_count(&self) -> impl Future<Output = Result<usize, FetchError>> + Send;
}

/// Contributors listing of a GitHub repository.
#[derive(Debug, Clone)]
pub struct GithubContributors {
    client: reqwest::Client,
    endpoint: String,
    per_page: u32,
}

impl GithubContributors {
    pub fn new(config: &ContributorsConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            per_page: config.per_page,
        })
    }
}

impl ContributorSource for GithubContributors {
    async fn fetch_count(&self) -> Result<usize, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("per_page", self.per_page)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let contributors: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(contributors.len())
    }
}

/// Text to display for a fetch result.
pub fn display_text(result: &Result<usize, FetchError>) -> String {
    match result {
        Ok(count) => format!("{}+", count),
        Err(_) => FALLBACK_TEXT.to_string(),
    }
}

/// State of a background count fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    /// The text has been written to the document
    Applied,
    /// The task was aborted before producing a result
    Cancelled,
}

/// Handle to the background fetch.
///
/// The fetch runs on its own task and only hands back the text to display;
/// the document is updated by whoever owns it, through [`poll`](Self::poll)
/// or [`finish`](Self::finish).
#[derive(Debug)]
pub struct ContributorCountTask {
    target: NodeId,
    handle: JoinHandle<()>,
    rx: oneshot::Receiver<String>,
}

impl ContributorCountTask {
    /// Start fetching into `#contributor-count`.
    ///
    /// Returns `None` when the element is missing. Without a Tokio runtime the
    /// fallback text is written immediately.
    pub fn start<S: ContributorSource>(doc: &mut Document, source: S) -> Option<Self> {
        let Some(target) = doc.get_element_by_id(COUNT_ID) else {
            tracing::debug!("No #{} element, skipping contributor fetch", COUNT_ID);
            return None;
        };

        if Handle::try_current().is_err() {
            tracing::warn!("Could not fetch contributor count: {}", FetchError::NoRuntime);
            doc.set_text(target, FALLBACK_TEXT);
            return None;
        }

        Some(Self::spawn(source, target))
    }

    /// Spawn the fetch on the current runtime.
    pub fn spawn<S: ContributorSource>(source: S, target: NodeId) -> Self {
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let result = source.fetch_count().await;
            match &result {
                Ok(count) => tracing::debug!(count, "Fetched contributor count"),
                Err(e) => tracing::warn!("Could not fetch contributor count: {}", e),
            }
            let _ = tx.send(display_text(&result));
        });

        Self { target, handle, rx }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Cancel the request. The element keeps its current text.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Apply the result if it has arrived.
    pub fn poll(&mut self, doc: &mut Document) -> TaskStatus {
        match self.rx.try_recv() {
            Ok(text) => {
                doc.set_text(self.target, text);
                TaskStatus::Applied
            }
            Err(TryRecvError::Empty) => TaskStatus::Pending,
            Err(TryRecvError::Closed) => TaskStatus::Cancelled,
        }
    }

    /// Wait for the result and apply it. Returns `false` if the task was aborted.
    pub async fn finish(self, doc: &mut Document) -> bool {
        match self.rx.await {
            Ok(text) => {
                doc.set_text(self.target, text);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Source that answers immediately with a fixed result.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedSource(pub Option<usize>);

    impl ContributorSource for FixedSource {
        async fn fetch_count(&self) -> Result<usize, FetchError> {
            self.0.ok_or(FetchError::Status(500))
        }
    }

    /// Source that never answers.
    #[derive(Debug, Clone, Copy)]
    pub struct PendingSource;

    impl ContributorSource for PendingSource {
        async fn fetch_count(&self) -> Result<usize, FetchError> {
            std::future::pending().await
        }
    }
}
