//! Response accumulation and snapshot rendering.

/// Delimiter line placed before and after the buffer.
pub const FENCE: &str = "```";

/// Wrap a buffer in a fenced block.
///
/// Pure: the same buffer always renders to the same string.
pub fn wrap(buffer: &str) -> String {
    format!("{FENCE}\n{buffer}\n{FENCE}")
}

/// Recover the buffer from a string produced by [`wrap`].
pub fn unwrap(snapshot: &str) -> Option<&str> {
    snapshot
        .strip_prefix(FENCE)?
        .strip_prefix('\n')?
        .strip_suffix(FENCE)?
        .strip_suffix('\n')
}

/// Append-only text buffer for one run.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    text: String,
    lines: usize,
}

impl ResponseBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sanitized line.
    ///
    /// Empty lines are rejected and leave the buffer untouched. Returns
    /// whether the line was accepted.
    pub fn push(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.lines > 0 {
            self.text.push('\n');
        }
        self.text.push_str(line);
        self.lines += 1;
        true
    }

    /// Current contents, lines joined by `\n`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of accepted lines.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Render the current contents with [`wrap`].
    pub fn snapshot(&self) -> String {
        wrap(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_format() {
        assert_eq!(wrap("Hello\nworld"), "```\nHello\nworld\n```");
        assert_eq!(wrap(""), "```\n\n```");
    }

    #[test]
    fn test_wrap_deterministic() {
        let buffer = "same input";
        assert_eq!(wrap(buffer), wrap(buffer));
    }

    #[test]
    fn test_unwrap_inverts_wrap() {
        assert_eq!(unwrap(&wrap("a\nb")), Some("a\nb"));
        assert_eq!(unwrap(&wrap("")), Some(""));
        assert_eq!(unwrap("not fenced"), None);
    }

    #[test]
    fn test_push_joins_lines() {
        let mut buffer = ResponseBuffer::new();
        assert!(buffer.push("Hello"));
        assert!(buffer.push("world"));
        assert_eq!(buffer.as_str(), "Hello\nworld");
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_empty_line_rejected() {
        let mut buffer = ResponseBuffer::new();
        assert!(!buffer.push(""));
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);

        buffer.push("x");
        assert!(!buffer.push(""));
        assert_eq!(buffer.as_str(), "x");
    }

    #[test]
    fn test_snapshots_grow_by_prefix() {
        let mut buffer = ResponseBuffer::new();
        let mut previous = String::new();
        for line in ["one", "two", "three"] {
            buffer.push(line);
            let snapshot = buffer.snapshot();
            let body = unwrap(&snapshot).unwrap();
            assert!(body.starts_with(&previous));
            assert!(body.len() > previous.len());
            previous = body.to_string();
        }
    }
}
