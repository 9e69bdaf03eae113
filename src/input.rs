//! Prompt loading from uploaded files.
//!
//! Plain text is read verbatim; PDFs are extracted page by page and the
//! pages concatenated. Everything else is rejected as unsupported input.

use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::error::RelayError;
use crate::Result;

/// File kinds accepted as prompt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFile {
    Text,
    Pdf,
}

impl PromptFile {
    /// Classify a path by its extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)?;

        match ext.as_str() {
            "txt" => Some(PromptFile::Text),
            "pdf" => Some(PromptFile::Pdf),
            _ => None,
        }
    }
}

/// Read a prompt from a TXT or PDF file.
pub async fn load_prompt(path: &Path) -> Result<String> {
    let kind = PromptFile::detect(path).ok_or_else(|| {
        RelayError::UnsupportedInput(format!(
            "{}: only TXT and PDF files are supported",
            path.display()
        ))
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        RelayError::UnsupportedInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), ?kind, bytes = bytes.len(), "prompt file loaded");

    match kind {
        PromptFile::Text => String::from_utf8(bytes).map_err(|_| {
            RelayError::UnsupportedInput(format!("{} is not valid UTF-8", path.display()))
        }),
        PromptFile::Pdf => extract_pdf(path, bytes).await,
    }
}

async fn extract_pdf(path: &Path, bytes: Vec<u8>) -> Result<String> {
    // The extractor is CPU-bound and may panic on malformed documents.
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            RelayError::UnsupportedInput(format!(
                "PDF extraction aborted for {}: {}",
                path.display(),
                e
            ))
        })?;

    extracted.map_err(|e| {
        RelayError::UnsupportedInput(format!(
            "cannot extract text from {}: {}",
            path.display(),
            e
        ))
    })
}
