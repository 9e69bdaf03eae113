//! Caller-facing entry point.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::input;
use crate::output::LineSanitizer;
use crate::runner::{ProcessRunner, Request, RunStream, RunnerSettings};

/// Models offered when no configuration overrides them.
pub const DEFAULT_MODELS: &[&str] = &[
    "phi4-model:latest",
    "phi4:latest",
    "wizardlm2:7b-fp16",
    "unzensiert:latest",
    "llama2-uncensored:7b-chat-q8_0",
    "teufel:latest",
    "Odin:latest",
    "luzifer:latest",
    "llama3:latest",
    "llama2-uncensored:latest",
];

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "phi4:latest";

/// Configured model identifiers.
///
/// Advisory only: identifiers outside the list are still passed to the
/// external program, which decides whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    available: Vec<String>,
    default: String,
}

impl ModelCatalog {
    pub fn new(available: Vec<String>, default: impl Into<String>) -> Self {
        Self {
            available,
            default: default.into(),
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn default_model(&self) -> &str {
        &self.default
    }

    pub fn contains(&self, model: &str) -> bool {
        self.available.iter().any(|m| m == model)
    }

    /// The requested model, or the default when none (or a blank one) is given.
    pub fn resolve(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.default.clone(),
        }
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            DEFAULT_MODEL,
        )
    }
}

/// Submits prompts and hands back run streams.
///
/// Cheap to share behind an `Arc`; every submission gets its own process
/// and buffer.
pub struct Relay {
    runner: ProcessRunner,
    catalog: ModelCatalog,
}

impl Relay {
    /// Create a new relay.
    pub fn new(
        settings: RunnerSettings,
        catalog: ModelCatalog,
        sanitizer: Arc<LineSanitizer>,
    ) -> Self {
        Self {
            runner: ProcessRunner::new(settings, sanitizer),
            catalog,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Start a run for `prompt` on `model`.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&self, prompt: impl Into<String>, model: impl Into<String>) -> RunStream {
        let request = Request::new(prompt, model);
        if !self.catalog.contains(request.model()) {
            debug!(model = request.model(), "model not in catalog, passing through");
        }
        self.runner.run(request)
    }

    /// Start a run whose prompt is read from a TXT or PDF file.
    ///
    /// Unreadable or unsupported files produce a stream with a single
    /// `Error` emission.
    pub async fn submit_file(&self, path: &Path, model: impl Into<String>) -> RunStream {
        match input::load_prompt(path).await {
            Ok(prompt) => self.submit(prompt, model),
            Err(e) => {
                debug!(path = %path.display(), "prompt file rejected: {}", e);
                RunStream::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunStatus;

    #[test]
    fn test_default_catalog() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.available().len(), 10);
        assert_eq!(catalog.default_model(), "phi4:latest");
        assert!(catalog.contains("llama3:latest"));
        assert!(!catalog.contains("mistral:latest"));
    }

    #[test]
    fn test_resolve_model() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.resolve(None), "phi4:latest");
        assert_eq!(catalog.resolve(Some("  ")), "phi4:latest");
        assert_eq!(catalog.resolve(Some("llama3:latest")), "llama3:latest");
        // Unknown ids pass through.
        assert_eq!(catalog.resolve(Some("mistral:latest")), "mistral:latest");
    }

    #[tokio::test]
    async fn test_submit_file_unsupported() {
        let relay = Relay::new(
            RunnerSettings::default(),
            ModelCatalog::default(),
            Arc::new(LineSanitizer::standard().unwrap()),
        );

        let emissions = relay
            .submit_file(Path::new("upload.docx"), "phi4:latest")
            .await
            .collect()
            .await;

        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].status, RunStatus::Error);
        assert!(emissions[0].content.is_empty());
    }
}
