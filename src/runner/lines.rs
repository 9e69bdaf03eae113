//! Incremental line reads over a process's stdout and stderr.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, trace};

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Stdout,
    Stderr,
}

/// Interleaves complete lines from two pipes as they become available.
///
/// Each pipe keeps its own partial-line buffer, so `next_line` is cancel
/// safe: a read dropped by `select!` resumes where it stopped.
pub(crate) struct MergedLines<O, E> {
    stdout: Option<BufReader<O>>,
    stderr: Option<BufReader<E>>,
    out_buf: Vec<u8>,
    err_buf: Vec<u8>,
}

impl<O, E> MergedLines<O, E>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    pub(crate) fn new(stdout: O, stderr: E) -> Self {
        Self {
            stdout: Some(BufReader::new(stdout)),
            stderr: Some(BufReader::new(stderr)),
            out_buf: Vec::new(),
            err_buf: Vec::new(),
        }
    }

    /// Next line without its `\n` terminator, or `None` once both pipes
    /// reached end of stream.
    ///
    /// Invalid UTF-8 is replaced lossily. A final fragment without a
    /// terminator is returned as a line.
    pub(crate) async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let (source, read) = match (self.stdout.as_mut(), self.stderr.as_mut()) {
                (None, None) => return Ok(None),
                (Some(out), None) => (
                    Source::Stdout,
                    out.read_until(b'\n', &mut self.out_buf).await,
                ),
                (None, Some(err)) => (
                    Source::Stderr,
                    err.read_until(b'\n', &mut self.err_buf).await,
                ),
                (Some(out), Some(err)) => tokio::select! {
                    read = out.read_until(b'\n', &mut self.out_buf) => (Source::Stdout, read),
                    read = err.read_until(b'\n', &mut self.err_buf) => (Source::Stderr, read),
                },
            };

            let n = read?;
            if n == 0 {
                debug!(?source, "end of stream");
                match source {
                    Source::Stdout => self.stdout = None,
                    Source::Stderr => self.stderr = None,
                }
            }

            let buf = match source {
                Source::Stdout => &mut self.out_buf,
                Source::Stderr => &mut self.err_buf,
            };
            if buf.is_empty() {
                continue;
            }

            let raw = std::mem::take(buf);
            trace!(?source, bytes = raw.len(), "line read");
            return Ok(Some(decode_line(&raw)));
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
