//! Consumer side of a run.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::emission::Emission;
use crate::error::RelayError;

/// Ordered emissions of one run.
///
/// The run is cancelled when this handle is dropped or [`cancel`] is
/// called; the external process is then killed and reaped.
///
/// [`cancel`]: RunStream::cancel
pub struct RunStream {
    rx: mpsc::Receiver<Emission>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RunStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Emission>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            cancel,
            task: Some(task),
        }
    }

    /// A run that failed before it could start.
    ///
    /// Yields a single `Error` emission for `err`.
    pub fn failed(err: RelayError) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: cannot be full or closed.
        let _ = tx.try_send(Emission::failed(&err));

        Self {
            rx,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Wait for the next emission. `None` after the terminal one.
    pub async fn next(&mut self) -> Option<Emission> {
        self.rx.recv().await
    }

    /// Drain the run and return every emission.
    pub async fn collect(mut self) -> Vec<Emission> {
        let mut emissions = Vec::new();
        while let Some(emission) = self.rx.recv().await {
            emissions.push(emission);
        }
        emissions
    }

    /// Drain the run and return only its terminal emission.
    pub async fn finish(mut self) -> Option<Emission> {
        let mut last = None;
        while let Some(emission) = self.rx.recv().await {
            last = Some(emission);
        }
        last
    }

    /// Token that cancels this run when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abandon the run and wait until the process has been reclaimed.
    ///
    /// No emissions are delivered after this returns.
    pub async fn cancel(mut self) {
        self.cancel.cancel();
        self.rx.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("run task panicked: {}", e);
            }
        }
    }
}

impl Stream for RunStream {
    type Item = Emission;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Emission>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for RunStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for RunStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("running", &self.task.as_ref().map(|t| !t.is_finished()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunStatus;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_failed_stream_single_emission() {
        let err = RelayError::UnsupportedInput("only TXT and PDF files are supported".into());
        let mut stream = RunStream::failed(err);

        let first = stream.next().await.unwrap();
        assert_eq!(first.status, RunStatus::Error);
        assert!(first.error.unwrap().contains("TXT and PDF"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_trait() {
        let stream = RunStream::failed(RelayError::UnsupportedInput("x".into()));
        let all: Vec<Emission> = StreamExt::collect(stream).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_cancels_token() {
        let stream = RunStream::failed(RelayError::UnsupportedInput("x".into()));
        let token = stream.cancellation_token();
        assert!(!token.is_cancelled());
        drop(stream);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_without_task() {
        let stream = RunStream::failed(RelayError::UnsupportedInput("x".into()));
        tokio_test::assert_ok!(
            tokio::time::timeout(std::time::Duration::from_secs(1), stream.cancel()).await
        );
    }
}
