//! API layer for ollama-relay.
//!
//! This module exposes the relay over HTTP and WebSocket.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//! - `GET /api/v1/models` - Configured models
//! - `POST /api/v1/generate` - Run a prompt to completion
//! - `WS /api/v1/ws` - Stream snapshots while the response is generated
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ollama_relay::api::{serve, AppState, ServerConfig};
//! use ollama_relay::output::LineSanitizer;
//! use ollama_relay::relay::{ModelCatalog, Relay};
//! use ollama_relay::runner::RunnerSettings;
//!
//! #[tokio::main]
//! async fn main() -> ollama_relay::Result<()> {
//!     let sanitizer = Arc::new(LineSanitizer::standard()?);
//!     let relay = Relay::new(RunnerSettings::default(), ModelCatalog::default(), sanitizer);
//!     serve(ServerConfig::default(), AppState::new(Arc::new(relay))).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;
pub mod websocket;

pub use handlers::AppState;
pub use router::{create_router, serve, ServerConfig};
pub use types::{ErrorResponse, GenerateRequest, GenerateResponse, ModelsResponse, WsMessage};
