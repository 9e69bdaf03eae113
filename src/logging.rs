//! Logging setup.
//!
//! Everything goes to stderr so `ask` output on stdout stays clean.

use tracing::Subscriber;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is available.
pub const DEFAULT_FILTER: &str = "ollama_relay=info";

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr),
    )
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
pub fn init() {
    subscriber(env_filter()).init();
}

/// Like [`init`], but returns an error instead of panicking when a
/// subscriber is already installed.
pub fn try_init() -> Result<(), TryInitError> {
    subscriber(env_filter()).try_init()
}

/// Install the global subscriber with an explicit filter directive.
///
/// A bare level such as `debug` is scoped to this crate; anything
/// containing `=` or `,` is used verbatim. A directive that does not parse
/// falls back to [`DEFAULT_FILTER`].
pub fn init_with_filter(directive: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(scoped_directive(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    subscriber(filter).try_init()
}

fn scoped_directive(directive: &str) -> String {
    if directive.contains('=') || directive.contains(',') {
        directive.to_string()
    } else {
        format!("ollama_relay={}", directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_an_error_not_a_panic() {
        let _ = try_init();
        assert!(try_init().is_err());
        assert!(init_with_filter("debug").is_err());
        tracing::debug!(target: "ollama_relay", "still logging");
    }

    #[test]
    fn test_scoped_directive() {
        assert_eq!(scoped_directive("debug"), "ollama_relay=debug");
        assert_eq!(scoped_directive("tower_http=trace"), "tower_http=trace");
        assert_eq!(scoped_directive("info,axum=warn"), "info,axum=warn");
    }
}
