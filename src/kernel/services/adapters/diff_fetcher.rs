//! Long-running `git diff-tree --stdin` session for one repository.
//!
//! diff-tree cannot be told to terminate a patch, so after each hash we also
//! write a bogus revision named [`SENTINEL`]. git fails to resolve it and
//! echoes the line back on stdout, which marks the end of the patch.
//!
//! Within one session git separates consecutive non-empty patches with a
//! blank line. `fetch` drops that leading `\n`, so the same commit yields the
//! same bytes whenever it is fetched.
//!
//! stderr is only drained once stdout has ended. A session that keeps
//! running while git writes more than a pipe buffer of warnings will stall.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

pub const SENTINEL: &str = "ENDOFPATCH";

const SENTINEL_LINE: &[u8] = b"ENDOFPATCH\n";

#[derive(Debug, thiserror::Error)]
pub enum DiffFetcherError {
    #[error("failed to start git diff-tree: {0}")]
    Start(#[source] std::io::Error),
    #[error("git diff-tree io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("git subprocess stderr: {0}")]
    Fetch(String),
    #[error("{0}")]
    Protocol(&'static str),
}

/// Owns the subprocess. `fetch` takes `&mut self` so round trips are
/// serialized, and `stop` consumes the handle.
pub struct DiffFetcher {
    child: Child,
    stdin: ChildStdin,
    stdout: SentinelFramer<ChildStdout>,
    stderr: ChildStderr,
}

impl std::fmt::Debug for DiffFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffFetcher")
            .field("pid", &self.child.id())
            .finish()
    }
}

impl DiffFetcher {
    pub fn start(dir: &Path) -> Result<Self, DiffFetcherError> {
        Self::start_with(dir, "git")
    }

    pub fn start_with(dir: &Path, git_binary: &str) -> Result<Self, DiffFetcherError> {
        let mut cmd = Command::new(git_binary);
        cmd.args([
            "diff-tree",
            "--stdin",
            "--no-prefix",
            "-p",
            "--format=format:",
            "--root",
        ])
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(DiffFetcherError::Start)?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        tracing::debug!(dir = %dir.display(), pid = ?child.id(), "diff fetcher started");

        Ok(Self {
            child,
            stdin,
            stdout: SentinelFramer::new(stdout),
            stderr,
        })
    }

    /// Returns the patch for `hash`, which is empty when the commit changes
    /// nothing. Hashes git cannot resolve are echoed back as the patch text.
    pub async fn fetch(&mut self, hash: &str) -> Result<Vec<u8>, DiffFetcherError> {
        let mut request = Vec::with_capacity(hash.len() + SENTINEL_LINE.len() + 1);
        request.extend_from_slice(hash.as_bytes());
        request.push(b'\n');
        request.extend_from_slice(SENTINEL_LINE);

        // A dead child shows up as EOF on stdout below, where stderr explains it.
        if let Err(e) = self.write_request(&request).await {
            tracing::debug!(error = %e, "diff fetcher stdin write failed");
        }

        if let Some(mut patch) = self.stdout.next_patch().await? {
            if patch.first() == Some(&b'\n') {
                patch.remove(0);
            }
            tracing::trace!(hash, bytes = patch.len(), "patch fetched");
            return Ok(patch);
        }

        let mut stderr = String::new();
        self.stderr.read_to_string(&mut stderr).await?;
        if !stderr.is_empty() {
            return Err(DiffFetcherError::Fetch(stderr));
        }
        Err(DiffFetcherError::Protocol("expected scan to succeed"))
    }

    /// Closes stdin, kills the subprocess and reaps it.
    pub async fn stop(self) {
        let Self {
            mut child, stdin, ..
        } = self;
        drop(stdin);
        if let Err(e) = child.kill().await {
            tracing::debug!(error = %e, "diff fetcher kill failed");
        }
        match child.wait().await {
            Ok(status) => tracing::debug!(%status, "diff fetcher stopped"),
            Err(e) => tracing::debug!(error = %e, "diff fetcher wait failed"),
        }
    }

    async fn write_request(&mut self, request: &[u8]) -> std::io::Result<()> {
        self.stdin.write_all(request).await?;
        self.stdin.flush().await
    }
}

fn missing_pipe(name: &str) -> DiffFetcherError {
    DiffFetcherError::Start(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("{name} unavailable"),
    ))
}

/// Splits a byte stream into chunks terminated by the sentinel line.
struct SentinelFramer<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> SentinelFramer<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::with_capacity(4096),
        }
    }

    /// Reads lines until one is exactly the sentinel and returns everything
    /// before it. `None` when the stream ends first.
    async fn next_patch(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        self.buf.clear();
        loop {
            let start = self.buf.len();
            let n = self.reader.read_until(b'\n', &mut self.buf).await?;
            if n == 0 {
                return Ok(None);
            }
            if &self.buf[start..] == SENTINEL_LINE {
                return Ok(Some(self.buf[..start].to_vec()));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/diff_fetcher.rs"]
mod tests;
