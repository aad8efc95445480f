//! Filter predicates and free-text search.
//!
//! Both are pure tests on a single record. A record passes the table's
//! filter stage when it matches the search term and every active predicate:
//!
//! ```text
//! keep = search(record) ∧ predicate₁(record) ∧ … ∧ predicateₙ(record)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::op::FilterOp;
use crate::record::Record;
use crate::value::Value;

/// A single `field operator value` condition.
///
/// ```
/// use tabulon_table::{FilterOp, Predicate, Record};
///
/// let older = Predicate::new("age", FilterOp::GreaterThan, 26);
/// assert!(older.matches(&Record::new().with("age", 30)));
/// assert!(!older.matches(&Record::new().with("age", 25)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: FilterOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Predicate {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::new(field, FilterOp::Equals, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::new(field, FilterOp::Contains, value)
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::new(field, FilterOp::GreaterThan, value)
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::new(field, FilterOp::LessThan, value)
    }

    /// Tests the predicate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_value(record.get(&self.field))
    }

    /// Tests the predicate against a field value.
    ///
    /// - `equals` requires the same value kind.
    /// - The substring operators compare lower-cased text forms; a null field
    ///   or null operand never matches.
    /// - `greaterThan`/`lessThan` coerce both sides to numbers; NaN on either
    ///   side fails.
    /// - Unknown operators always pass.
    pub fn matches_value(&self, value: &Value) -> bool {
        match &self.operator {
            FilterOp::Equals => value.strict_eq(&self.value),
            FilterOp::Contains => self.text_test(value, |v, needle| v.contains(needle)),
            FilterOp::StartsWith => self.text_test(value, |v, needle| v.starts_with(needle)),
            FilterOp::EndsWith => self.text_test(value, |v, needle| v.ends_with(needle)),
            FilterOp::GreaterThan => value.to_number() > self.value.to_number(),
            FilterOp::LessThan => value.to_number() < self.value.to_number(),
            FilterOp::Unknown(_) => true,
        }
    }

    fn text_test(&self, value: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
        match (value.to_text(), self.value.to_text()) {
            (Some(haystack), Some(needle)) => {
                test(&haystack.to_lowercase(), &needle.to_lowercase())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Tests every predicate against a record (logical AND; empty passes).
pub fn matches_all(predicates: &[Predicate], record: &Record) -> bool {
    predicates.iter().all(|p| p.matches(record))
}

/// Free-text search over the filterable columns.
///
/// A record matches when the lower-cased text of any filterable column
/// contains the lower-cased term. An empty term matches every record.
pub fn matches_search(columns: &[Column], record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    columns
        .iter()
        .filter(|c| c.filterable)
        .filter_map(|c| record.get(&c.id).to_text())
        .any(|text| text.to_lowercase().contains(&needle))
}
