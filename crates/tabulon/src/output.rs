//! Output mode control.
//!
//! [`OutputMode`] is the value of the `--output` flag. Text renders an
//! aligned table for people; the other modes serialize the command's data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Controls how command output is rendered.
///
/// - `Auto` - Text on a terminal, JSON when piped
/// - `Text` - Aligned plain-text table
/// - `Json`, `Yaml`, `Csv` - Serialize data directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Text on a terminal, JSON when piped
    #[default]
    Auto,
    /// Aligned plain-text table
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Rows as CSV
    Csv,
}

impl OutputMode {
    /// Returns true if this is a structured output mode (JSON, YAML, CSV).
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Yaml | OutputMode::Csv)
    }

    /// Resolves Auto to Text or Json depending on whether stdout is a
    /// terminal. Other modes are returned unchanged.
    pub fn resolve_auto(&self, stdout_is_terminal: bool) -> OutputMode {
        match self {
            OutputMode::Auto if stdout_is_terminal => OutputMode::Text,
            OutputMode::Auto => OutputMode::Json,
            other => *other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Auto => "auto",
            OutputMode::Text => "text",
            OutputMode::Json => "json",
            OutputMode::Yaml => "yaml",
            OutputMode::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutputMode::Auto),
            "text" => Ok(OutputMode::Text),
            "json" => Ok(OutputMode::Json),
            "yaml" | "yml" => Ok(OutputMode::Yaml),
            "csv" => Ok(OutputMode::Csv),
            other => Err(format!(
                "unknown output mode '{other}' (expected auto, text, json, yaml or csv)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_auto() {
        assert_eq!(OutputMode::default(), OutputMode::Auto);
    }

    #[test]
    fn structured_modes() {
        assert!(OutputMode::Json.is_structured());
        assert!(OutputMode::Yaml.is_structured());
        assert!(OutputMode::Csv.is_structured());
        assert!(!OutputMode::Text.is_structured());
        assert!(!OutputMode::Auto.is_structured());
    }

    #[test]
    fn resolve_auto_by_terminal() {
        assert_eq!(OutputMode::Auto.resolve_auto(true), OutputMode::Text);
        assert_eq!(OutputMode::Auto.resolve_auto(false), OutputMode::Json);
        assert_eq!(OutputMode::Csv.resolve_auto(true), OutputMode::Csv);
    }

    #[test]
    fn parse_names() {
        assert_eq!("YML".parse::<OutputMode>(), Ok(OutputMode::Yaml));
        assert!("xml".parse::<OutputMode>().is_err());
    }
}
