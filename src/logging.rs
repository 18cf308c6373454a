use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::kernel::services::adapters::ensure_log_dir;

const LOG_FILE: &str = "commit-search.log";

pub const DEFAULT_FILTER: &str = "commit_search=info";

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

#[derive(Clone)]
struct TeeMakeWriter {
    file: NonBlocking,
    stderr: bool,
}

struct TeeWriter {
    file: NonBlocking,
    stderr: Option<io::Stderr>,
}

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.file.make_writer(),
            stderr: self.stderr.then(io::stderr),
        }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        if let Some(stderr) = self.stderr.as_mut() {
            let _ = stderr.write_all(&buf[..n]);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if let Some(stderr) = self.stderr.as_mut() {
            stderr.flush()?;
        }
        Ok(())
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `filter`.
///
/// Returns `None` when no log directory is usable or a subscriber is
/// already installed.
pub fn init(log_dir: Option<&Path>, verbose: bool, filter: &str) -> Option<LoggingGuard> {
    let log_dir = match log_dir {
        Some(dir) => std::fs::create_dir_all(dir).map(|_| dir.to_path_buf()),
        None => ensure_log_dir(),
    }
    .or_else(|_| -> io::Result<PathBuf> {
        let dir = std::env::temp_dir().join("commit-search").join("logs");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    })
    .ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let writer = TeeMakeWriter {
        file: non_blocking,
        stderr: verbose,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}
