//! Fan-out of one commit query across repositories.
//!
//! Every repository with at least one resolved revision gets its own task.
//! Tasks share a cancellation token; the first failure cancels the rest and
//! is what the caller sees. Results already sent to the sink stay there.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::assemble::assemble_all;
use crate::kernel::compile::{compile_with_diagnostics, CompileDiagnostics};
use crate::kernel::query::{is_case_sensitive, QueryNode, SearchOptions};
use crate::kernel::services::ports::protocol::{Predicate, ProtocolCommitMatch, SearchRequest};
use crate::kernel::services::ports::search::{
    RepositoryRevisions, Result, SearchClient, SearchError, SearchEvent, SearchSink,
};

pub async fn dispatch(
    client: Arc<dyn SearchClient>,
    repos: Vec<RepositoryRevisions>,
    query: &[QueryNode],
    options: &SearchOptions,
    sink: Arc<dyn SearchSink>,
) -> Result<()> {
    let parent = CancellationToken::new();
    dispatch_with_cancel(client, repos, query, options, sink, &parent).await
}

/// Like [`dispatch`], but cancelling `parent` also stops every repository task.
pub async fn dispatch_with_cancel(
    client: Arc<dyn SearchClient>,
    repos: Vec<RepositoryRevisions>,
    query: &[QueryNode],
    options: &SearchOptions,
    sink: Arc<dyn SearchSink>,
    parent: &CancellationToken,
) -> Result<()> {
    let predicate = build_predicate(query, options);
    let token = parent.child_token();
    let mut tasks = JoinSet::new();

    for RepositoryRevisions { repo, revs } in repos {
        if revs.is_empty() {
            tracing::trace!(repo = %repo.name, "no resolved revisions, skipping");
            continue;
        }

        let request = SearchRequest {
            repo: repo.name.clone(),
            revisions: revs,
            query: predicate.clone(),
            include_diff: options.diff,
            limit: options.limit,
        };
        let client = client.clone();
        let sink = sink.clone();
        let token = token.clone();
        let diff = options.diff;

        tasks.spawn(async move {
            let mut on_matches = |batch: Vec<ProtocolCommitMatch>| {
                sink.send(SearchEvent::matches(assemble_all(batch, diff, &repo)));
            };

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(SearchError::Cancelled),
                res = client.search(&token, request, &mut on_matches) => res,
            };

            sink.send(SearchEvent::stats(matches!(outcome, Ok(true))));
            if let Err(e) = &outcome {
                tracing::debug!(repo = %repo.name, error = %e, "repository search ended with error");
            }
            outcome.map(|_| ())
        });
    }

    tracing::debug!(
        tasks = tasks.len(),
        predicate_nodes = predicate.size(),
        "commit search dispatched"
    );

    let mut first_err: Option<SearchError> = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(SearchError::TaskFailed(e.to_string())),
            Err(_) => Err(SearchError::Cancelled),
        };

        let Err(err) = outcome else {
            continue;
        };
        if !token.is_cancelled() {
            tracing::debug!(error = %err, "cancelling remaining repository searches");
            token.cancel();
        }
        match &first_err {
            None => first_err = Some(err),
            Some(SearchError::Cancelled) if err != SearchError::Cancelled => first_err = Some(err),
            Some(_) => {}
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// All top-level query nodes must hold, so they are joined under one `And`.
pub fn build_predicate(query: &[QueryNode], options: &SearchOptions) -> Predicate {
    let options = SearchOptions {
        case_sensitive: options.case_sensitive || is_case_sensitive(query),
        ..*options
    };
    let mut diagnostics = CompileDiagnostics::default();
    let children = compile_with_diagnostics(query, &options, &mut diagnostics);
    for dropped in &diagnostics.dropped {
        tracing::debug!(%dropped, "query node has no commit predicate");
    }
    Predicate::and(children)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/dispatch.rs"]
mod tests;
