//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::relay::ModelCatalog;
use crate::runner::{Emission, RunStatus};

/// Request to generate a response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Prompt text.
    pub prompt: String,
    /// Model identifier; the configured default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

/// Terminal result of a generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Final status (`complete` or `error`).
    pub status: RunStatus,
    /// Human-readable status line.
    pub status_message: String,
    /// Fenced response text; empty on error.
    pub content: String,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn from_emission(emission: Emission) -> Self {
        Self {
            status: emission.status,
            status_message: emission.status.message().to_string(),
            content: emission.content,
            error: emission.error,
        }
    }
}

/// Configured models.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    /// Offered model identifiers.
    pub models: Vec<String>,
    /// Model used when none is given.
    pub default: String,
}

impl ModelsResponse {
    pub fn from_catalog(catalog: &ModelCatalog) -> Self {
        Self {
            models: catalog.available().to_vec(),
            default: catalog.default_model().to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn empty_prompt() -> Self {
        Self::new("EMPTY_PROMPT", "prompt must not be empty")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Client request to start a generation.
    Generate {
        prompt: String,
        #[serde(default)]
        model: Option<String>,
    },
    /// One emission of the running generation.
    Snapshot {
        content: String,
        status: RunStatus,
        status_message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Protocol error.
    Error { code: String, message: String },
    /// Ping (client to server).
    Ping,
    /// Pong (server to client).
    Pong,
}

impl WsMessage {
    pub fn snapshot(emission: Emission) -> Self {
        WsMessage::Snapshot {
            status_message: emission.status.message().to_string(),
            content: emission.content,
            status: emission.status,
            error: emission.error,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        WsMessage::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_default_model() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.prompt, "hi");
        assert!(req.model.is_none());
    }

    #[test]
    fn test_ws_generate_parse() {
        let json = r#"{"type": "generate", "prompt": "hi", "model": "llama3:latest"}"#;
        let msg: WsMessage = serde_json::from_str(json).unwrap();
        match msg {
            WsMessage::Generate { prompt, model } => {
                assert_eq!(prompt, "hi");
                assert_eq!(model.as_deref(), Some("llama3:latest"));
            }
            _ => panic!("Expected Generate message"),
        }
    }

    #[test]
    fn test_ws_snapshot_serialize() {
        let msg = WsMessage::Snapshot {
            content: "```\nHello\n```".into(),
            status: RunStatus::Generating,
            status_message: RunStatus::Generating.message().into(),
            error: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["status"], "generating");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_ws_ping_parse() {
        let msg: WsMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, WsMessage::Ping));
    }

    #[test]
    fn test_models_response() {
        let resp = ModelsResponse::from_catalog(&ModelCatalog::default());
        assert_eq!(resp.default, "phi4:latest");
        assert!(resp.models.contains(&"llama3:latest".to_string()));
    }
}
