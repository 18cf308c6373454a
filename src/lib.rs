//! commit-search - commit and diff search execution
//!
//! Module layout:
//! - kernel: query AST, predicate compiler, highlights, commit results
//! - kernel::services::ports: wire contracts and collaborator traits
//! - kernel::services::adapters: dispatcher, result assembly, git diff session, settings
//! - logging: tracing subscriber setup

pub mod kernel;
pub mod logging;
