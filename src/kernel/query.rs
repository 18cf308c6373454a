//! Parsed search query as handed over by the query layer.
//!
//! Nodes are immutable once built. The compiler in [`crate::kernel::compile`]
//! walks them with exhaustive matches, so a new node kind or field is a
//! compile-time obligation there.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QueryNode {
    Operator {
        kind: OperatorKind,
        #[serde(default)]
        operands: Vec<QueryNode>,
    },
    Pattern {
        value: String,
        #[serde(default)]
        negated: bool,
        #[serde(default)]
        is_literal: bool,
    },
    Parameter {
        field: Field,
        value: String,
        #[serde(default)]
        negated: bool,
    },
}

impl QueryNode {
    pub fn and(operands: Vec<QueryNode>) -> Self {
        Self::Operator {
            kind: OperatorKind::And,
            operands,
        }
    }

    pub fn or(operands: Vec<QueryNode>) -> Self {
        Self::Operator {
            kind: OperatorKind::Or,
            operands,
        }
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
            negated: false,
            is_literal: false,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
            negated: false,
            is_literal: true,
        }
    }

    pub fn param(field: Field, value: impl Into<String>) -> Self {
        Self::Parameter {
            field,
            value: value.into(),
            negated: false,
        }
    }

    /// Returns the same node with its negation flag set. Operators carry no
    /// negation of their own and are returned unchanged.
    pub fn negate(self) -> Self {
        match self {
            Self::Pattern {
                value, is_literal, ..
            } => Self::Pattern {
                value,
                negated: true,
                is_literal,
            },
            Self::Parameter { field, value, .. } => Self::Parameter {
                field,
                value,
                negated: true,
            },
            op @ Self::Operator { .. } => op,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
    And,
    Or,
    /// Free-text concatenation. Should be resolved before compilation.
    Concat,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Author,
    Committer,
    Before,
    After,
    Message,
    Content,
    File,
    Lang,
    Repo,
    Type,
    Case,
    Count,
    Select,
    Other(String),
}

impl Field {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Author => "author",
            Self::Committer => "committer",
            Self::Before => "before",
            Self::After => "after",
            Self::Message => "message",
            Self::Content => "content",
            Self::File => "file",
            Self::Lang => "lang",
            Self::Repo => "repo",
            Self::Type => "type",
            Self::Case => "case",
            Self::Count => "count",
            Self::Select => "select",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call switches for compilation and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Search diffs instead of commit messages.
    pub diff: bool,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            diff: false,
            limit: 500,
        }
    }
}

/// `case:yes` anywhere in the query turns on case sensitivity.
pub fn is_case_sensitive(nodes: &[QueryNode]) -> bool {
    nodes.iter().any(|node| match node {
        QueryNode::Parameter {
            field: Field::Case,
            value,
            ..
        } => value.eq_ignore_ascii_case("yes"),
        QueryNode::Operator { operands, .. } => is_case_sensitive(operands),
        QueryNode::Pattern { .. } | QueryNode::Parameter { .. } => false,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/query.rs"]
mod tests;
