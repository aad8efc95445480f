//! Filter operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a filter [`Predicate`](crate::Predicate).
///
/// Operator names use the camelCase spelling of the table's wire format
/// (`"greaterThan"`). Parsing never fails: a name the engine does not know is
/// kept as [`FilterOp::Unknown`], and predicates using it let every record
/// through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOp {
    /// Strict equality.
    Equals,
    /// Case-insensitive substring.
    Contains,
    /// Case-insensitive prefix.
    StartsWith,
    /// Case-insensitive suffix.
    EndsWith,
    /// Numeric greater-than.
    GreaterThan,
    /// Numeric less-than.
    LessThan,
    /// Unrecognised operator name.
    Unknown(String),
}

impl FilterOp {
    /// Every operator the engine evaluates.
    pub const KNOWN: [FilterOp; 6] = [
        FilterOp::Equals,
        FilterOp::Contains,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::GreaterThan,
        FilterOp::LessThan,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::GreaterThan => "greaterThan",
            FilterOp::LessThan => "lessThan",
            FilterOp::Unknown(name) => name,
        }
    }

    /// Returns `true` for the substring operators.
    pub fn is_text_op(&self) -> bool {
        matches!(
            self,
            FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FilterOp::Unknown(_))
    }

    /// Parses an operator name. Short aliases (`eq`, `gt`, `lt`, ...) are
    /// accepted alongside the canonical names.
    pub fn parse(name: &str) -> FilterOp {
        match name {
            "equals" | "eq" | "=" | "==" => FilterOp::Equals,
            "contains" => FilterOp::Contains,
            "startsWith" | "startswith" => FilterOp::StartsWith,
            "endsWith" | "endswith" => FilterOp::EndsWith,
            "greaterThan" | "gt" | ">" => FilterOp::GreaterThan,
            "lessThan" | "lt" | "<" => FilterOp::LessThan,
            other => FilterOp::Unknown(other.to_string()),
        }
    }
}

impl FromStr for FilterOp {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FilterOp::parse(s))
    }
}

impl From<String> for FilterOp {
    fn from(name: String) -> Self {
        FilterOp::parse(&name)
    }
}

impl From<FilterOp> for String {
    fn from(op: FilterOp) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        for op in FilterOp::KNOWN {
            assert_eq!(FilterOp::parse(op.as_str()), op);
        }
    }

    #[test]
    fn parse_aliases() {
        assert_eq!(FilterOp::parse("gt"), FilterOp::GreaterThan);
        assert_eq!(FilterOp::parse("<"), FilterOp::LessThan);
        assert_eq!(FilterOp::parse("eq"), FilterOp::Equals);
        assert_eq!(FilterOp::parse("startswith"), FilterOp::StartsWith);
    }

    #[test]
    fn unknown_names_are_kept() {
        let op = FilterOp::parse("isEmpty");
        assert_eq!(op, FilterOp::Unknown("isEmpty".into()));
        assert!(!op.is_known());
        assert_eq!(op.to_string(), "isEmpty");
    }

    #[test]
    fn op_categories() {
        assert!(FilterOp::Contains.is_text_op());
        assert!(!FilterOp::Equals.is_text_op());
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&FilterOp::GreaterThan).unwrap();
        assert_eq!(json, "\"greaterThan\"");

        let op: FilterOp = serde_json::from_str("\"between\"").unwrap();
        assert_eq!(op, FilterOp::Unknown("between".into()));
    }
}
