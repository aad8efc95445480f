//! Records: open field-name to value mappings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::value::Value;

/// One row of tabular data.
///
/// The engine does not fix a schema; the column list decides which fields
/// are shown, searched and sorted. Missing fields read as [`Value::Null`].
///
/// ```
/// use tabulon_table::{Record, Value};
///
/// let bob = Record::new().with("name", "Bob").with("age", 30);
/// assert_eq!(bob.get("name"), &Value::from("Bob"));
/// assert!(bob.get("email").is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

static NULL: Value = Value::Null;

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Reads a field. Missing fields read as null.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record has the field, even when it is null.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Record> {
        match json {
            serde_json::Value::Object(map) => Ok(Record {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            }),
            other => Err(TableError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Converts every field named by a column into that column's kind.
    ///
    /// Fields that do not parse as the column kind are kept unchanged.
    pub fn coerce(&mut self, columns: &[Column]) {
        for column in columns {
            if let Some(value) = self.fields.get_mut(&column.id) {
                let raw = std::mem::take(value);
                *value = column.kind.coerce(raw);
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parses a JSON array of objects into records.
pub fn records_from_json(text: &str) -> Result<Vec<Record>> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    match json {
        serde_json::Value::Array(items) => items.into_iter().map(Record::from_json).collect(),
        other => Err(TableError::NotAnArray {
            found: json_kind(&other),
        }),
    }
}

/// Stable identity of a record, used by the selection set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey(s)
    }
}

/// Extracts a [`RowKey`] from a record.
///
/// Selection survives refetches because it compares keys, not record
/// instances. A record for which the extractor returns `None` cannot be
/// selected.
#[derive(Clone)]
pub struct KeyFn(Arc<dyn Fn(&Record) -> Option<RowKey> + Send + Sync>);

impl KeyFn {
    /// Uses the text form of a primary-key field.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        KeyFn(Arc::new(move |record: &Record| {
            record.get(&name).to_text().map(RowKey)
        }))
    }

    /// Uses an arbitrary extractor.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Option<RowKey> + Send + Sync + 'static,
    {
        KeyFn(Arc::new(f))
    }

    pub fn key_of(&self, record: &Record) -> Option<RowKey> {
        (self.0)(record)
    }
}

impl Default for KeyFn {
    fn default() -> Self {
        KeyFn::field("id")
    }
}

impl fmt::Debug for KeyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyFn(..)")
    }
}
