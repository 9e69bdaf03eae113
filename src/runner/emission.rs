//! Run emissions and status.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::output::{self, ResponseBuffer};

/// Status attached to every emission of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Output is still arriving.
    Generating,
    /// The process exited and all output has been delivered.
    Complete,
    /// The run failed; nothing follows.
    Error,
}

impl RunStatus {
    /// Whether this status ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::Error)
    }

    /// Human-readable status line.
    pub fn message(&self) -> &'static str {
        match self {
            RunStatus::Generating => "Generating response...",
            RunStatus::Complete => "Response generated.",
            RunStatus::Error => "Error: the request could not be processed.",
        }
    }
}

/// One update delivered to the caller.
///
/// `content` is always a complete fenced snapshot (never a delta), so a
/// renderer can replace whatever it showed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    /// Wrapped snapshot; empty for errors.
    pub content: String,
    /// Run status at the time of this emission.
    pub status: RunStatus,
    /// Failure description, set only with [`RunStatus::Error`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Emission {
    pub(crate) fn generating(buffer: &ResponseBuffer) -> Self {
        Self {
            content: buffer.snapshot(),
            status: RunStatus::Generating,
            error: None,
        }
    }

    pub(crate) fn complete(buffer: &ResponseBuffer) -> Self {
        Self {
            content: buffer.snapshot(),
            status: RunStatus::Complete,
            error: None,
        }
    }

    pub(crate) fn failed(err: &RelayError) -> Self {
        Self {
            content: String::new(),
            status: RunStatus::Error,
            error: Some(err.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Accumulated text without the fence.
    pub fn body(&self) -> &str {
        output::unwrap(&self.content).unwrap_or("")
    }

    /// Content for renderers that show a single text field.
    pub fn display(&self) -> String {
        match &self.error {
            Some(message) => format!("**Error:** {}", message),
            None => self.content.clone(),
        }
    }
}
