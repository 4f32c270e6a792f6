use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

/// Severity bucket for a recoverable diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Unrecognized characters in the input text.
    Lexical,
    /// A line matched no stanza or is missing a required field.
    Syntax,
    /// Input was understood but is inconsistent or out of range.
    RedFlag,
    /// Input was understood but has no counterpart in the lowered model.
    Unimplemented,
}

/// One recoverable diagnostic with an optional source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub code: String,
    pub message: String,
    pub span: Option<Span>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "line {}: {} ({})", span.line, self.message, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

/// Append-only collector of diagnostics for one parse/lower invocation.
///
/// Each invocation owns its own sink. Callers aggregating several files
/// merge finished sinks with [`Warnings::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, warning: Warning) {
        self.entries.push(warning);
    }

    pub fn lexical(&mut self, code: &str, message: impl Into<String>, span: Option<Span>) {
        self.add(WarningKind::Lexical, code, message, span);
    }

    pub fn syntax(&mut self, code: &str, message: impl Into<String>, span: Option<Span>) {
        self.add(WarningKind::Syntax, code, message, span);
    }

    pub fn red_flag(&mut self, code: &str, message: impl Into<String>, span: Option<Span>) {
        self.add(WarningKind::RedFlag, code, message, span);
    }

    pub fn unimplemented(&mut self, code: &str, message: impl Into<String>, span: Option<Span>) {
        self.add(WarningKind::Unimplemented, code, message, span);
    }

    fn add(&mut self, kind: WarningKind, code: &str, message: impl Into<String>, span: Option<Span>) {
        self.entries.push(Warning {
            kind,
            code: code.to_string(),
            message: message.into(),
            span,
        });
    }

    /// Move all diagnostics from `other` onto the end of this sink.
    pub fn merge(&mut self, other: Warnings) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    /// Human-readable rendering of every diagnostic, in recording order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Diagnostics recorded before lowering (lexical and syntax tiers).
    pub fn parse_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.entries
            .iter()
            .filter(|w| matches!(w.kind, WarningKind::Lexical | WarningKind::Syntax))
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.entries.iter().any(|w| w.code == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Warnings {
    type Item = Warning;
    type IntoIter = std::vec::IntoIter<Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_code() {
        let mut warnings = Warnings::new();
        warnings.syntax(
            "missing-field",
            "access-list line is missing an action",
            Some(Span {
                line: 7,
                column: 0,
                start_byte: 120,
                end_byte: 145,
            }),
        );
        assert_eq!(
            warnings.messages(),
            vec!["line 7: access-list line is missing an action (missing-field)"]
        );
    }

    #[test]
    fn merge_keeps_order_and_parse_filter_selects_front_end_tiers() {
        let mut first = Warnings::new();
        first.lexical("control-character", "odd byte", None);
        let mut second = Warnings::new();
        second.red_flag("undefined-reference", "missing acl", None);
        second.syntax("unrecognized-stanza", "unknown", None);

        first.merge(second);
        assert_eq!(first.len(), 3);
        assert!(first.has_code("undefined-reference"));
        let parse_codes = first.parse_warnings().map(|w| w.code.as_str()).collect::<Vec<_>>();
        assert_eq!(parse_codes, vec!["control-character", "unrecognized-stanza"]);
    }

    #[test]
    fn sink_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Warnings>();
    }
}
