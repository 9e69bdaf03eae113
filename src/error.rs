//! Error types for ollama-relay.

use thiserror::Error;

/// Main error type for relay operations.
///
/// Every variant that can occur during a run is converted into a terminal
/// [`Emission`](crate::runner::Emission) rather than returned to the caller.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The external program could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the prompt or reading output failed.
    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// Upstream input that cannot be turned into a prompt.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// A sanitizer rule failed to compile.
    #[error("invalid sanitizer pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_display_names_program() {
        let err = RelayError::Spawn {
            program: "ollama".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to start"));
        assert!(msg.contains("`ollama`"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_transport_display() {
        let err = RelayError::Transport(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        assert!(err.to_string().contains("transport error"));
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_unsupported_input_display() {
        let err = RelayError::UnsupportedInput("only TXT and PDF files are supported".into());
        assert!(err.to_string().starts_with("unsupported input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelayError = io_err.into();
        assert!(matches!(err, RelayError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_pattern_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: RelayError = regex_err.into();
        assert!(matches!(err, RelayError::Pattern(_)));
    }
}
