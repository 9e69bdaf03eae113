//! # ollama-relay
//!
//! Streams sanitized, render-ready snapshots of a line-oriented model CLI.
//!
//! A [`Relay`] launches one external process per prompt (by default
//! `ollama run <model>`), writes the prompt to its stdin, and reads the
//! merged stdout/stderr line by line. Each line has terminal escapes,
//! spinner glyphs, carriage returns, and flush markers removed; surviving
//! lines are appended to a buffer and the whole buffer is re-emitted as a
//! fenced snapshot.
//!
//! ## Features
//!
//! - **Snapshot semantics**: every emission is complete, never a delta
//! - **Uniform errors**: spawn, I/O, and input failures end the run with a
//!   single `Error` emission
//! - **Cancellation**: dropping a [`RunStream`] kills and reaps the process
//! - **API**: optional HTTP/WebSocket surface via axum
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ollama_relay::{LineSanitizer, ModelCatalog, Relay, RunnerSettings};
//!
//! #[tokio::main]
//! async fn main() -> ollama_relay::Result<()> {
//!     ollama_relay::logging::try_init().ok();
//!
//!     let sanitizer = Arc::new(LineSanitizer::standard()?);
//!     let relay = Relay::new(RunnerSettings::default(), ModelCatalog::default(), sanitizer);
//!
//!     let mut run = relay.submit("Why is the sky blue?", "phi4:latest");
//!     while let Some(emission) = run.next().await {
//!         println!("{}\n{}", emission.status.message(), emission.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod relay;
pub mod runner;

// Re-export commonly used types
pub use error::{RelayError, Result};
pub use output::{LineSanitizer, ResponseBuffer};
pub use relay::{ModelCatalog, Relay};
pub use runner::{Emission, ProcessRunner, Request, RunStatus, RunStream, RunnerSettings};
