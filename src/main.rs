//! commit-search: compile commit queries and extract commit patches.
//!
//! Commands:
//! - compile: print the predicate tree (or full request) for a JSON query
//! - diff: print patches for commits using one git diff-tree session
//! - init: write the default settings file if none exists

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use commit_search::kernel::compile::{compile_with_diagnostics, CompileDiagnostics};
use commit_search::kernel::query::{is_case_sensitive, QueryNode, SearchOptions};
use commit_search::kernel::services::adapters::{
    ensure_settings_file, resolve_settings, DiffFetcher, DiffFetcherError, SettingsError,
};
use commit_search::kernel::services::ports::{
    Predicate, RevisionSpecifier, SearchRequest, Settings,
};
use commit_search::logging;

#[derive(Parser)]
#[command(name = "commit-search")]
#[command(about = "Commit and diff search execution tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user config location)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON query into the predicate tree sent to shards
    Compile {
        /// Query node or array of query nodes as JSON
        query: String,

        #[arg(long)]
        case_sensitive: bool,

        /// Match patterns against diffs instead of commit messages
        #[arg(long)]
        diff: bool,

        /// Print the whole search request for this repository
        #[arg(long)]
        repo: Option<String>,

        /// Revisions for --repo (defaults to HEAD)
        #[arg(long = "rev", requires = "repo")]
        revs: Vec<String>,

        /// Match limit for --repo (defaults to the configured limit)
        #[arg(long, requires = "repo")]
        limit: Option<usize>,
    },

    /// Print the patch of each commit
    Diff {
        /// Repository working directory
        #[arg(short, long)]
        repo: PathBuf,

        /// Commit hashes
        #[arg(required = true)]
        hashes: Vec<String>,
    },

    /// Write default settings to the per-user config location and print its path
    Init,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("invalid query json: {0}")]
    Query(#[source] serde_json::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{hash}: {source}")]
    Diff {
        hash: String,
        #[source]
        source: DiffFetcherError,
    },
    #[error(transparent)]
    Start(DiffFetcherError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryInput {
    Many(Vec<QueryNode>),
    One(QueryNode),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match resolve_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("commit-search: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_guard = logging::init(None, cli.verbose, &settings.log_filter);
    if cli.verbose {
        if let Some(guard) = &log_guard {
            eprintln!("logging to {}", guard.log_dir().display());
        }
    }

    let result = match cli.command {
        Commands::Compile {
            query,
            case_sensitive,
            diff,
            repo,
            revs,
            limit,
        } => run_compile(&settings, &query, case_sensitive, diff, repo, revs, limit),
        Commands::Diff { repo, hashes } => run_diff(&settings, repo, hashes),
        Commands::Init => ensure_settings_file()
            .map(|path| println!("{}", path.display()))
            .map_err(CliError::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("commit-search: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_compile(
    settings: &Settings,
    query: &str,
    case_sensitive: bool,
    diff: bool,
    repo: Option<String>,
    revs: Vec<String>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let nodes = match serde_json::from_str::<QueryInput>(query).map_err(CliError::Query)? {
        QueryInput::Many(nodes) => nodes,
        QueryInput::One(node) => vec![node],
    };

    let options = SearchOptions {
        case_sensitive: case_sensitive || is_case_sensitive(&nodes),
        diff,
        limit: limit.unwrap_or(settings.default_limit),
    };
    let mut diagnostics = CompileDiagnostics::default();
    let predicate = Predicate::and(compile_with_diagnostics(&nodes, &options, &mut diagnostics));

    let json = match repo {
        Some(repo) => {
            let revisions = if revs.is_empty() {
                vec![RevisionSpecifier::rev_spec("HEAD")]
            } else {
                revs.into_iter().map(RevisionSpecifier::rev_spec).collect()
            };
            let request = SearchRequest {
                repo,
                revisions,
                query: predicate,
                include_diff: options.diff,
                limit: options.limit,
            };
            serde_json::to_string_pretty(&request)
        }
        None => serde_json::to_string_pretty(&predicate),
    }
    .map_err(CliError::Encode)?;

    println!("{json}");
    for dropped in &diagnostics.dropped {
        eprintln!("dropped: {dropped}");
    }
    Ok(())
}

fn run_diff(settings: &Settings, repo: PathBuf, hashes: Vec<String>) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut fetcher =
            DiffFetcher::start_with(&repo, &settings.git_binary).map_err(CliError::Start)?;

        let mut result = Ok(());
        let mut stdout = std::io::stdout().lock();
        for hash in hashes {
            match fetcher.fetch(&hash).await {
                Ok(patch) => {
                    if let Err(e) = stdout.write_all(&patch) {
                        result = Err(e.into());
                        break;
                    }
                }
                Err(source) => {
                    result = Err(CliError::Diff { hash, source });
                    break;
                }
            }
        }
        if let Err(e) = stdout.flush() {
            tracing::debug!(error = %e, "stdout flush failed");
        }
        drop(stdout);

        fetcher.stop().await;
        result
    })
}
