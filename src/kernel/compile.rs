//! Query AST to predicate tree.
//!
//! Nodes without a commit-search meaning (concatenations, unrelated fields,
//! unknown languages, unparsable dates) contribute no predicate. Each such
//! node is recorded in [`CompileDiagnostics`] so callers can tell a narrowed
//! query from an intact one.

use crate::kernel::git_date::{parse_git_date, GitDateError};
use crate::kernel::language::lang_to_file_regex;
use crate::kernel::query::{Field, OperatorKind, QueryNode, SearchOptions};
use crate::kernel::services::ports::protocol::Predicate;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dropped {
    Operator(OperatorKind),
    Field(Field),
    UnknownLanguage(String),
    InvalidDate {
        field: Field,
        value: String,
        error: GitDateError,
    },
}

impl std::fmt::Display for Dropped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dropped::Operator(kind) => write!(f, "unsupported operator {:?}", kind),
            Dropped::Field(field) => write!(f, "field {}: has no commit predicate", field),
            Dropped::UnknownLanguage(lang) => write!(f, "unknown language {:?}", lang),
            Dropped::InvalidDate { field, error, .. } => write!(f, "{}: {}", field, error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileDiagnostics {
    pub dropped: Vec<Dropped>,
}

impl CompileDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dropped.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    case_sensitive: bool,
    diff: bool,
    now: DateTime<Utc>,
}

impl QueryCompiler {
    pub fn new(case_sensitive: bool, diff: bool) -> Self {
        Self {
            case_sensitive,
            diff,
            now: Utc::now(),
        }
    }

    /// Reference time for relative dates such as `2 weeks ago`.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn compile(&self, nodes: &[QueryNode], diagnostics: &mut CompileDiagnostics) -> Vec<Predicate> {
        nodes
            .iter()
            .filter_map(|node| self.compile_node(node, diagnostics))
            .collect()
    }

    fn compile_node(&self, node: &QueryNode, diagnostics: &mut CompileDiagnostics) -> Option<Predicate> {
        match node {
            QueryNode::Operator { kind, operands } => match kind {
                OperatorKind::And => Some(Predicate::and(self.compile(operands, diagnostics))),
                OperatorKind::Or => Some(Predicate::or(self.compile(operands, diagnostics))),
                OperatorKind::Concat => {
                    diagnostics.dropped.push(Dropped::Operator(*kind));
                    None
                }
            },
            QueryNode::Pattern {
                value,
                negated,
                is_literal,
            } => {
                let expr = if *is_literal {
                    regex::escape(value)
                } else {
                    value.clone()
                };
                let pred = self.content_predicate(expr);
                Some(negate_if(pred, *negated))
            }
            QueryNode::Parameter {
                field,
                value,
                negated,
            } => self
                .compile_parameter(field, value, diagnostics)
                .map(|pred| negate_if(pred, *negated)),
        }
    }

    fn compile_parameter(
        &self,
        field: &Field,
        value: &str,
        diagnostics: &mut CompileDiagnostics,
    ) -> Option<Predicate> {
        let ignore_case = !self.case_sensitive;
        let pred = match field {
            Field::Author => Predicate::AuthorMatches {
                expr: value.to_string(),
                ignore_case,
            },
            Field::Committer => Predicate::CommitterMatches {
                expr: value.to_string(),
                ignore_case,
            },
            Field::Before | Field::After => {
                let time = match parse_git_date(value, self.now) {
                    Ok(time) => time,
                    Err(error) => {
                        tracing::warn!(field = %field, value, error = %error, "date filter dropped");
                        diagnostics.dropped.push(Dropped::InvalidDate {
                            field: field.clone(),
                            value: value.to_string(),
                            error,
                        });
                        return None;
                    }
                };
                if *field == Field::Before {
                    Predicate::CommitBefore { time }
                } else {
                    Predicate::CommitAfter { time }
                }
            }
            Field::Message => Predicate::message_matches(value, ignore_case),
            Field::Content => self.content_predicate(value.to_string()),
            Field::File => Predicate::DiffModifiesFile {
                expr: value.to_string(),
                ignore_case,
            },
            Field::Lang => {
                let Some(expr) = lang_to_file_regex(value) else {
                    diagnostics
                        .dropped
                        .push(Dropped::UnknownLanguage(value.to_string()));
                    return None;
                };
                Predicate::DiffModifiesFile {
                    expr,
                    ignore_case: true,
                }
            }
            Field::Repo
            | Field::Type
            | Field::Case
            | Field::Count
            | Field::Select
            | Field::Other(_) => {
                diagnostics.dropped.push(Dropped::Field(field.clone()));
                return None;
            }
        };
        Some(pred)
    }

    /// Free text and `content:` search the diff in diff mode, the message otherwise.
    fn content_predicate(&self, expr: String) -> Predicate {
        if self.diff {
            Predicate::diff_matches(expr, !self.case_sensitive)
        } else {
            Predicate::message_matches(expr, !self.case_sensitive)
        }
    }
}

fn negate_if(pred: Predicate, negated: bool) -> Predicate {
    if negated {
        Predicate::not(pred)
    } else {
        pred
    }
}

pub fn compile_with_diagnostics(
    nodes: &[QueryNode],
    options: &SearchOptions,
    diagnostics: &mut CompileDiagnostics,
) -> Vec<Predicate> {
    QueryCompiler::new(options.case_sensitive, options.diff).compile(nodes, diagnostics)
}

/// Compiles `nodes` into predicates, logging anything that was dropped.
pub fn compile(nodes: &[QueryNode], case_sensitive: bool, diff: bool) -> Vec<Predicate> {
    let mut diagnostics = CompileDiagnostics::default();
    let preds = QueryCompiler::new(case_sensitive, diff).compile(nodes, &mut diagnostics);
    if !diagnostics.is_empty() {
        tracing::debug!(
            dropped = diagnostics.len(),
            first = %diagnostics.dropped[0],
            "query nodes without a commit predicate"
        );
    }
    preds
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/compile.rs"]
mod tests;
