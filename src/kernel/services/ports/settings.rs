use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Executable used for diff extraction.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    /// Per-repository match limit when the caller gives none.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_limit() -> usize {
    500
}

fn default_log_filter() -> String {
    "commit_search=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            default_limit: default_limit(),
            log_filter: default_log_filter(),
        }
    }
}
