//! Output processing.
//!
//! This module turns raw process output into displayable text:
//! - Per-line removal of terminal escapes and CLI noise
//! - Accumulation of accepted lines into fenced snapshots
//!
//! # Example
//!
//! ```
//! use ollama_relay::output::{LineSanitizer, ResponseBuffer};
//!
//! let sanitizer = LineSanitizer::standard().unwrap();
//! let mut buffer = ResponseBuffer::new();
//!
//! for raw in ["Hello", "\x1b[2K\x1b[1G", "\x1b[2Kworld"] {
//!     buffer.push(&sanitizer.sanitize(raw));
//! }
//! assert_eq!(buffer.snapshot(), "```\nHello\nworld\n```");
//! ```

mod sanitizer;
mod snapshot;

pub use sanitizer::{LineSanitizer, SanitizeRule, STANDARD_RULES};
pub use snapshot::{unwrap, wrap, ResponseBuffer, FENCE};
