//! Service adapters: runtime implementations (async tasks, git, files).

pub mod assemble;
pub mod diff_fetcher;
pub mod dispatch;
pub mod settings;

pub use assemble::{assemble, assemble_all};
pub use diff_fetcher::{DiffFetcher, DiffFetcherError};
pub use dispatch::{dispatch, dispatch_with_cancel};
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_log_dir, get_settings_path, load_settings,
    resolve_settings, SettingsError,
};
