//! Headless search core (query, predicates, results).

pub mod commit;
pub mod compile;
pub mod git_date;
pub mod highlight;
pub mod language;
pub mod query;
pub mod services;

pub use commit::{Commit, CommitMatch, RepoName};
pub use compile::{compile, compile_with_diagnostics, CompileDiagnostics, Dropped, QueryCompiler};
pub use git_date::{parse_git_date, GitDateError};
pub use highlight::{HighlightedRange, HighlightedString, Location, Range};
pub use language::{lang_to_file_regex, LanguageId};
pub use query::{Field, OperatorKind, QueryNode, SearchOptions};
