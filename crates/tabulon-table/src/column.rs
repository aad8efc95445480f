//! Column descriptors.
//!
//! A [`Column`] names a record field and says how the table treats it:
//! whether it can be sorted on, whether search and the filter catalog look at
//! it, how wide it is, how it is aligned, and how its values are displayed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::{Number, Timestamp, Value};

/// Text alignment within a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// The kind of data a column holds.
///
/// Kinds decide how raw values are coerced when records are loaded and which
/// operators the filter catalog offers for the column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    /// Text drawn from a fixed set of options.
    Select,
}

impl ColumnKind {
    /// Converts a raw value into this kind when it parses; otherwise returns
    /// it unchanged.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (ColumnKind::Number, Value::String(s)) => parse_number(&s)
                .map(Value::Number)
                .unwrap_or(Value::String(s)),
            (ColumnKind::Date, Value::String(s)) => Timestamp::parse(&s)
                .map(Value::Timestamp)
                .unwrap_or(Value::String(s)),
            (ColumnKind::Date, Value::Number(n)) => {
                Value::Timestamp(Timestamp::from_millis(n.to_f64() as i64))
            }
            (ColumnKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(s),
            },
            (_, other) => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Select => "select",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a number, keeping integers exact.
pub(crate) fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::I64(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::U64(u));
    }
    text.parse::<f64>().ok().map(Number::F64)
}

/// Display formatter for a column's values.
///
/// Formatters are caller code: if one panics, the panic reaches whoever
/// asked for the cell text.
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(&Value) -> String + Send + Sync>);

impl Formatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Formatter(Arc::new(f))
    }

    pub fn format(&self, value: &Value) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

fn default_true() -> bool {
    true
}

/// Describes one table column.
///
/// Columns deserialize from configuration; formatters can only be attached
/// in code.
///
/// ```
/// use tabulon_table::{Align, Column, ColumnKind};
///
/// let amount = Column::new("amount", "Amount")
///     .kind(ColumnKind::Number)
///     .align(Align::Right)
///     .width(12)
///     .format(|v| format!("${}", v));
///
/// assert!(amount.sortable);
/// assert_eq!(amount.display(&12.into()), "$12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Record field this column reads.
    pub id: String,
    /// Header text.
    pub label: String,
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether search and the filter catalog consider this column.
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Minimum display width, in terminal columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub kind: ColumnKind,
    /// Option labels for `select` columns, as `(value, label)` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip)]
    pub formatter: Option<Formatter>,
}

/// A labelled value of a `select` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl Column {
    /// Creates a sortable, filterable, left-aligned text column.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            label: label.into(),
            sortable: true,
            filterable: true,
            width: None,
            align: Align::Left,
            kind: ColumnKind::Text,
            options: Vec::new(),
            formatter: None,
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn option(mut self, value: impl Into<Value>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Attaches a display formatter.
    pub fn format<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Formatter::new(f));
        self
    }

    /// Display text for a value of this column.
    ///
    /// Uses the formatter when present, the option label for `select`
    /// columns, and the value's text form otherwise (empty for null).
    pub fn display(&self, value: &Value) -> String {
        if let Some(formatter) = &self.formatter {
            return formatter.format(value);
        }
        if let Some(option) = self.options.iter().find(|o| o.value.strict_eq(value)) {
            return option.label.clone();
        }
        value.to_text().unwrap_or_default()
    }

    /// Display text for this column's cell in `record`.
    pub fn cell(&self, record: &Record) -> String {
        self.display(record.get(&self.id))
    }
}

/// Builds columns from the field names and value kinds of a sample record.
pub fn infer_columns(sample: &Record) -> Vec<Column> {
    sample
        .iter()
        .map(|(field, value)| {
            let kind = match value {
                Value::Number(_) => ColumnKind::Number,
                Value::Bool(_) => ColumnKind::Boolean,
                Value::Timestamp(_) => ColumnKind::Date,
                _ => ColumnKind::Text,
            };
            let align = if kind == ColumnKind::Number {
                Align::Right
            } else {
                Align::Left
            };
            Column::new(field, humanize(field)).kind(kind).align(align)
        })
        .collect()
}

/// `first_name` -> `First name`
fn humanize(field: &str) -> String {
    let spaced = field.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
