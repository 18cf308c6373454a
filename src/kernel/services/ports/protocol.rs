//! Wire contract with the remote commit searcher.
//!
//! The predicate tree is built once per search call and sent as-is inside a
//! [`SearchRequest`]. Results come back as [`ProtocolCommitMatch`] batches.

use crate::kernel::highlight::Range;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Predicate {
    And {
        children: Vec<Predicate>,
    },
    Or {
        children: Vec<Predicate>,
    },
    Not {
        child: Box<Predicate>,
    },
    MessageMatches {
        expr: String,
        ignore_case: bool,
    },
    DiffMatches {
        expr: String,
        ignore_case: bool,
    },
    AuthorMatches {
        expr: String,
        ignore_case: bool,
    },
    CommitterMatches {
        expr: String,
        ignore_case: bool,
    },
    CommitBefore {
        time: DateTime<Utc>,
    },
    CommitAfter {
        time: DateTime<Utc>,
    },
    DiffModifiesFile {
        expr: String,
        ignore_case: bool,
    },
}

impl Predicate {
    pub fn and(children: Vec<Predicate>) -> Self {
        Self::And { children }
    }

    pub fn or(children: Vec<Predicate>) -> Self {
        Self::Or { children }
    }

    pub fn not(child: Predicate) -> Self {
        Self::Not {
            child: Box::new(child),
        }
    }

    pub fn message_matches(expr: impl Into<String>, ignore_case: bool) -> Self {
        Self::MessageMatches {
            expr: expr.into(),
            ignore_case,
        }
    }

    pub fn diff_matches(expr: impl Into<String>, ignore_case: bool) -> Self {
        Self::DiffMatches {
            expr: expr.into(),
            ignore_case,
        }
    }

    /// Number of nodes in the tree, root included.
    pub fn size(&self) -> usize {
        match self {
            Self::And { children } | Self::Or { children } => {
                1 + children.iter().map(Predicate::size).sum::<usize>()
            }
            Self::Not { child } => 1 + child.size(),
            Self::MessageMatches { .. }
            | Self::DiffMatches { .. }
            | Self::AuthorMatches { .. }
            | Self::CommitterMatches { .. }
            | Self::CommitBefore { .. }
            | Self::CommitAfter { .. }
            | Self::DiffModifiesFile { .. } => 1,
        }
    }
}

/// Which commits of a repository to search. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSpecifier {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rev_spec: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ref_glob: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exclude_ref_glob: String,
}

impl RevisionSpecifier {
    pub fn rev_spec(spec: impl Into<String>) -> Self {
        Self {
            rev_spec: spec.into(),
            ..Self::default()
        }
    }

    pub fn ref_glob(glob: impl Into<String>) -> Self {
        Self {
            ref_glob: glob.into(),
            ..Self::default()
        }
    }

    pub fn exclude_ref_glob(glob: impl Into<String>) -> Self {
        Self {
            exclude_ref_glob: glob.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub repo: String,
    pub revisions: Vec<RevisionSpecifier>,
    pub query: Predicate,
    pub include_diff: bool,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A field of a commit together with the ranges the remote matched in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedContent {
    pub content: String,
    #[serde(default)]
    pub matched_ranges: Vec<Range>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCommitMatch {
    pub oid: String,
    pub author: Signature,
    pub committer: Signature,
    pub message: MatchedContent,
    #[serde(default)]
    pub diff: MatchedContent,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/protocol.rs"]
mod tests;
