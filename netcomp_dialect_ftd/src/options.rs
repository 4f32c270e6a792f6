use serde::{Deserialize, Serialize};

/// Hostname assumed when the configuration has no `hostname` stanza.
pub const DEFAULT_HOSTNAME: &str = "ftd";

/// Options controlling parse-time reporting and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub default_hostname: String,
    pub warn_unknown_stanzas: bool,
    pub warn_unknown_body_lines: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_hostname: DEFAULT_HOSTNAME.to_string(),
            warn_unknown_stanzas: true,
            warn_unknown_body_lines: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the hostname used when none is configured.
    pub fn with_default_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.default_hostname = hostname.into();
        self
    }

    /// Toggle warnings for unrecognized top-level stanzas and block body lines.
    pub fn with_unknown_warnings(mut self, enabled: bool) -> Self {
        self.warn_unknown_stanzas = enabled;
        self.warn_unknown_body_lines = enabled;
        self
    }
}
