//! Commit search results as handed to callers.

use crate::kernel::highlight::HighlightedString;
use crate::kernel::services::ports::protocol::Signature;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoName {
    pub id: u32,
    pub name: String,
}

impl RepoName {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub author: Signature,
    pub committer: Option<Signature>,
    pub message: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMatch {
    pub commit: Commit,
    pub repo: RepoName,
    pub message_preview: Option<HighlightedString>,
    pub diff_preview: Option<HighlightedString>,
    /// Fenced markdown preview; highlights are in body coordinates.
    pub body: HighlightedString,
}
