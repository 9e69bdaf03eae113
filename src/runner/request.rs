//! Run request representation.

/// A single prompt/model pair submitted for one run.
///
/// Immutable once built; the runner takes ownership for the run's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    prompt: String,
    model: String,
}

impl Request {
    /// Create a new request.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
        }
    }

    /// The prompt text, without a line terminator.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Model identifier passed to the external program.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The prompt as written to the process: one newline-terminated line.
    pub(crate) fn input_line(&self) -> String {
        format!("{}\n", self.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let req = Request::new("Why is the sky blue?", "phi4:latest");
        assert_eq!(req.prompt(), "Why is the sky blue?");
        assert_eq!(req.model(), "phi4:latest");
    }

    #[test]
    fn test_input_line_terminated() {
        let req = Request::new("hi", "m");
        assert_eq!(req.input_line(), "hi\n");
        assert_eq!(Request::new("", "m").input_line(), "\n");
    }
}
