//! External process execution.
//!
//! This module drives one model CLI process per request:
//! - Spawning with merged stdout/stderr
//! - Writing the prompt as a single line
//! - Streaming sanitized snapshots as lines arrive
//! - Cancellation and process reclamation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ollama_relay::output::LineSanitizer;
//! use ollama_relay::runner::{ProcessRunner, Request, RunnerSettings};
//!
//! # async fn demo() -> ollama_relay::Result<()> {
//! let sanitizer = Arc::new(LineSanitizer::standard()?);
//! let runner = ProcessRunner::new(RunnerSettings::default(), sanitizer);
//!
//! let mut run = runner.run(Request::new("Why is the sky blue?", "phi4:latest"));
//! while let Some(emission) = run.next().await {
//!     println!("[{:?}] {}", emission.status, emission.display());
//! }
//! # Ok(())
//! # }
//! ```

mod emission;
mod lines;
mod process;
mod request;
mod stream;

pub use emission::{Emission, RunStatus};
pub use process::{
    ProcessRunner, RunnerSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PROGRAM, DEFAULT_SUBCOMMAND,
};
pub use request::Request;
pub use stream::RunStream;
