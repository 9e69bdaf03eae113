//! Process runner: one external process per request.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::emission::Emission;
use super::lines::MergedLines;
use super::request::Request;
use super::stream::RunStream;
use crate::error::RelayError;
use crate::output::{LineSanitizer, ResponseBuffer};
use crate::Result;

/// Default external program.
pub const DEFAULT_PROGRAM: &str = "ollama";

/// Default subcommand passed before the model identifier.
pub const DEFAULT_SUBCOMMAND: &str = "run";

/// Default number of emissions buffered between runner and consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// How the external program is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Program name or path.
    pub program: String,
    /// First argument; the model identifier follows it.
    pub subcommand: String,
    /// Emission channel capacity.
    pub channel_capacity: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            subcommand: DEFAULT_SUBCOMMAND.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Launches the external program and streams sanitized snapshots.
pub struct ProcessRunner {
    settings: Arc<RunnerSettings>,
    sanitizer: Arc<LineSanitizer>,
}

impl ProcessRunner {
    /// Create a new runner.
    pub fn new(settings: RunnerSettings, sanitizer: Arc<LineSanitizer>) -> Self {
        Self {
            settings: Arc::new(settings),
            sanitizer,
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Start a run on the current tokio runtime.
    ///
    /// Emissions arrive on the returned [`RunStream`] in append order and
    /// end with exactly one `Complete` or `Error`. Dropping the stream
    /// terminates the process.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn run(&self, request: Request) -> RunStream {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let cancel = CancellationToken::new();

        let job = RunJob {
            settings: Arc::clone(&self.settings),
            sanitizer: Arc::clone(&self.sanitizer),
            request,
            tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(job.drive());

        RunStream::new(rx, cancel, task)
    }
}

/// How a run ended when it did not fail.
enum Outcome {
    Finished(ResponseBuffer),
    Cancelled,
}

/// State owned by a single run's task.
struct RunJob {
    settings: Arc<RunnerSettings>,
    sanitizer: Arc<LineSanitizer>,
    request: Request,
    tx: mpsc::Sender<Emission>,
    cancel: CancellationToken,
}

impl RunJob {
    #[instrument(skip_all, fields(program = %self.settings.program, model = %self.request.model()))]
    async fn drive(self) {
        let mut child = match self.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("{}", e);
                let _ = self.tx.send(Emission::failed(&e)).await;
                return;
            }
        };
        info!(pid = child.id(), "process started");

        let outcome = self.pump(&mut child).await;
        if !matches!(outcome, Ok(Outcome::Finished(_))) {
            terminate(&mut child).await;
        }

        match outcome {
            Ok(Outcome::Finished(buffer)) => {
                info!(lines = buffer.line_count(), bytes = buffer.len(), "run complete");
                let _ = self.tx.send(Emission::complete(&buffer)).await;
            }
            Ok(Outcome::Cancelled) => {
                debug!("run cancelled");
            }
            Err(e) => {
                warn!("run failed: {}", e);
                let _ = self.tx.send(Emission::failed(&e)).await;
            }
        }
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.settings.program)
            .arg(&self.settings.subcommand)
            .arg(self.request.model())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RelayError::Spawn {
                program: self.settings.program.clone(),
                source,
            })
    }

    /// Write the prompt and forward lines until both pipes close and the
    /// process has exited.
    ///
    /// The prompt write is polled in the same `select!` as the reads; a
    /// prompt larger than the pipe buffer must not block output.
    async fn pump(&self, child: &mut Child) -> Result<Outcome> {
        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let input = self.request.input_line();
        let input_len = input.len();
        let write = async move {
            let mut stdin = stdin;
            stdin.write_all(input.as_bytes()).await?;
            stdin.flush().await?;
            // Closing stdin signals end of prompt.
            drop(stdin);
            Ok::<_, std::io::Error>(())
        };
        tokio::pin!(write);
        let mut writing = true;

        let mut lines = MergedLines::new(stdout, stderr);
        let mut buffer = ResponseBuffer::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(Outcome::Cancelled),
                written = &mut write, if writing => {
                    writing = false;
                    written.map_err(RelayError::Transport)?;
                    trace!(bytes = input_len, "prompt written, stdin closed");
                    continue;
                }
                next = lines.next_line() => next.map_err(RelayError::Transport)?,
            };
            let Some(raw) = next else { break };

            let line = self.sanitizer.sanitize(&raw);
            if !buffer.push(&line) {
                trace!("line dropped after sanitizing");
                continue;
            }

            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(Outcome::Cancelled),
                sent = self.tx.send(Emission::generating(&buffer)) => sent,
            };
            if sent.is_err() {
                debug!("receiver dropped");
                return Ok(Outcome::Cancelled);
            }
        }

        if writing {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(Outcome::Cancelled),
                written = &mut write => written.map_err(RelayError::Transport)?,
            }
            trace!(bytes = input_len, "prompt written after output closed");
        }

        let status = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Outcome::Cancelled),
            status = child.wait() => status.map_err(RelayError::Transport)?,
        };
        if !status.success() {
            warn!(code = ?status.code(), "process exited with non-zero status");
        }

        Ok(Outcome::Finished(buffer))
    }
}

fn missing_pipe(name: &str) -> RelayError {
    RelayError::Transport(std::io::Error::other(format!("{} was not captured", name)))
}

/// Kill and reap the child. Safe to call on a process that already exited.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        trace!("kill: {}", e);
    }
    match child.wait().await {
        Ok(status) => debug!(?status, "process reaped"),
        Err(e) => warn!("failed to reap process: {}", e),
    }
}
