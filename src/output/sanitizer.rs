//! Line sanitization for model CLI output.

use std::borrow::Cow;

use regex::Regex;

use crate::Result;

/// A named removal pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeRule {
    /// Short identifier used in logs.
    pub name: &'static str,
    /// Regular expression; every match is removed.
    pub pattern: &'static str,
}

/// Rules applied by [`LineSanitizer::standard`], in order.
///
/// Later rules may match residue left by earlier ones, so the general
/// escape removal comes first.
pub const STANDARD_RULES: &[SanitizeRule] = &[
    // OSC, then CSI (7-bit and 8-bit introducer), then two-byte escapes.
    // CSI must be tried before the two-byte form or `ESC [` alone is eaten.
    SanitizeRule {
        name: "ansi_escape",
        pattern: r"\x1B\][^\x07\x1B]*(?:\x07|\x1B\\)|(?:\x1B\[|\x{9B})[0-?]*[ -/]*[@-~]|\x1B[@-Z\\-_]",
    },
    SanitizeRule {
        name: "mode_toggle",
        pattern: r"\?\d+[lh]",
    },
    SanitizeRule {
        name: "spinner",
        pattern: r"[\x{2800}-\x{28FF}]",
    },
    SanitizeRule {
        name: "carriage_return",
        pattern: r"\r",
    },
    SanitizeRule {
        name: "flush_marker",
        pattern: r"2K1G ?(?:2K1G)*!?",
    },
];

struct CompiledRule {
    name: &'static str,
    regex: Regex,
}

/// Strips terminal noise from single output lines.
///
/// Compiled once and shared (typically behind an `Arc`) between runs.
/// `sanitize` takes `&self` and holds no per-call state.
pub struct LineSanitizer {
    rules: Vec<CompiledRule>,
}

impl LineSanitizer {
    /// Compile the standard rule set.
    pub fn standard() -> Result<Self> {
        Self::from_rules(STANDARD_RULES)
    }

    /// Compile an explicit, ordered rule set.
    pub fn from_rules(rules: &[SanitizeRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<CompiledRule> {
                Ok(CompiledRule {
                    name: rule.name,
                    regex: Regex::new(rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Remove every rule's matches from `raw`, in rule order.
    ///
    /// Never fails. A line without matches comes back unchanged; an
    /// incomplete escape at the end of the line is left as text.
    pub fn sanitize(&self, raw: &str) -> String {
        let mut line = Cow::Borrowed(raw);

        for rule in &self.rules {
            let replaced = match rule.regex.replace_all(&line, "") {
                Cow::Borrowed(_) => None,
                Cow::Owned(s) => Some(s),
            };
            if let Some(s) = replaced {
                tracing::trace!(rule = rule.name, "sanitizer rule matched");
                line = Cow::Owned(s);
            }
        }

        line.into_owned()
    }

    /// Names of the compiled rules, in application order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }
}

impl std::fmt::Debug for LineSanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSanitizer")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}
