use super::protocol::{ProtocolCommitMatch, RevisionSpecifier, SearchRequest};
use crate::kernel::commit::{CommitMatch, RepoName};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search backend error: {0}")]
    Client(String),
    #[error("search cancelled")]
    Cancelled,
    #[error("search task failed: {0}")]
    TaskFailed(String),
}

/// A repository together with the revisions that were resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRevisions {
    pub repo: RepoName,
    pub revs: Vec<RevisionSpecifier>,
}

impl RepositoryRevisions {
    pub fn new(repo: RepoName, revs: Vec<RevisionSpecifier>) -> Self {
        Self { repo, revs }
    }
}

/// Remote commit searcher.
///
/// Batches for one request are passed to `on_matches` in the order the
/// remote emits them, and the returned error (if any) comes after the last
/// batch. Calls share no state. Implementations should return
/// [`SearchError::Cancelled`] once `ctx` is cancelled.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns whether the remote stopped early because `request.limit` was hit.
    async fn search(
        &self,
        ctx: &CancellationToken,
        request: SearchRequest,
        on_matches: &mut (dyn FnMut(Vec<ProtocolCommitMatch>) + Send),
    ) -> Result<bool>;
}

#[async_trait::async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
    async fn search(
        &self,
        ctx: &CancellationToken,
        request: SearchRequest,
        on_matches: &mut (dyn FnMut(Vec<ProtocolCommitMatch>) + Send),
    ) -> Result<bool> {
        (**self).search(ctx, request, on_matches).await
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub is_limit_hit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchEvent {
    pub results: Vec<CommitMatch>,
    pub stats: Stats,
}

impl SearchEvent {
    pub fn matches(results: Vec<CommitMatch>) -> Self {
        Self {
            results,
            stats: Stats::default(),
        }
    }

    pub fn stats(is_limit_hit: bool) -> Self {
        Self {
            results: Vec::new(),
            stats: Stats { is_limit_hit },
        }
    }
}

/// Receives events from every in-flight repository task at once.
pub trait SearchSink: Send + Sync {
    fn send(&self, event: SearchEvent);
}

impl SearchSink for tokio::sync::mpsc::UnboundedSender<SearchEvent> {
    fn send(&self, event: SearchEvent) {
        if tokio::sync::mpsc::UnboundedSender::send(self, event).is_err() {
            tracing::debug!("search event receiver dropped");
        }
    }
}

/// Buffers every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<SearchEvent> {
        self.events
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn result_count(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.iter().map(|e| e.results.len()).sum(),
            Err(poisoned) => poisoned.get_ref().iter().map(|e| e.results.len()).sum(),
        }
    }
}

impl SearchSink for CollectingSink {
    fn send(&self, event: SearchEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/search.rs"]
mod tests;
