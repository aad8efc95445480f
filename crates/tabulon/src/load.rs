//! Loading records, columns and filter arguments.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tabulon_table::{
    infer_columns, records_from_json, Column, ColumnKind, FilterOp, Predicate, Record, Value,
};

use crate::env::StdinReader;

/// Reads a JSON array of records from a file, or from stdin when `source`
/// is `-`.
pub fn read_records(source: &str, stdin: &dyn StdinReader) -> Result<Vec<Record>> {
    let text = if source == "-" {
        if stdin.is_terminal() {
            bail!("no records piped on stdin; pass --records FILE");
        }
        stdin.read_to_string().context("failed to read records from stdin")?
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read records from {source}"))?
    };
    let records = records_from_json(&text).with_context(|| format!("invalid records in {source}"))?;
    log::debug!("loaded {} records from {source}", records.len());
    Ok(records)
}

/// Reads column descriptors. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn read_columns(path: &Path) -> Result<Vec<Column>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read columns from {}", path.display()))?;
    let columns: Vec<Column> = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid columns in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid columns in {}", path.display()))?
    };
    Ok(columns)
}

/// Columns from a file, or inferred from the first record.
pub fn resolve_columns(path: Option<&Path>, records: &[Record]) -> Result<Vec<Column>> {
    match path {
        Some(path) => read_columns(path),
        None => Ok(records.first().map(infer_columns).unwrap_or_default()),
    }
}

/// Parses `field:operator:value`.
///
/// The value is everything after the second colon, so it may itself contain
/// colons. When the field names a column, the value is converted to that
/// column's kind; for other fields numeric text becomes a number.
pub fn parse_filter(arg: &str, columns: &[Column]) -> Result<Predicate> {
    let mut parts = arg.splitn(3, ':');
    let (Some(field), Some(op), Some(raw)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("invalid filter '{arg}': expected FIELD:OPERATOR:VALUE");
    };
    if field.is_empty() {
        bail!("invalid filter '{arg}': missing field name");
    }

    let operator = FilterOp::parse(op);
    let kind = columns
        .iter()
        .find(|c| c.id == field)
        .map(|c| c.kind)
        .unwrap_or(ColumnKind::Number);
    let value = match kind {
        // Text operators always compare text forms.
        _ if operator.is_text_op() => Value::from(raw),
        ColumnKind::Text | ColumnKind::Select => Value::from(raw),
        other => other.coerce(Value::from(raw)),
    };
    Ok(Predicate::new(field, operator, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockStdin;
    use tabulon_table::{Number, Timestamp};

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("age", "Age").kind(ColumnKind::Number),
            Column::new("joined", "Joined").kind(ColumnKind::Date),
        ]
    }

    #[test]
    fn filter_values_follow_column_kind() {
        let p = parse_filter("age:gt:26", &columns()).unwrap();
        assert_eq!(p, Predicate::greater_than("age", 26));

        let p = parse_filter("name:equals:30", &columns()).unwrap();
        assert_eq!(p.value, Value::from("30"));

        let p = parse_filter("joined:lessThan:1970-01-02", &columns()).unwrap();
        assert_eq!(p.value, Value::Timestamp(Timestamp(86_400_000)));
    }

    #[test]
    fn filter_value_may_contain_colons() {
        let p = parse_filter("joined:equals:1970-01-01T00:00:01Z", &columns()).unwrap();
        assert_eq!(p.value, Value::Timestamp(Timestamp(1_000)));
    }

    #[test]
    fn text_operators_keep_text() {
        let p = parse_filter("age:contains:3", &columns()).unwrap();
        assert_eq!(p.value, Value::from("3"));
    }

    #[test]
    fn unknown_fields_parse_numbers() {
        let p = parse_filter("score:equals:7", &columns()).unwrap();
        assert_eq!(p.value, Value::Number(Number::I64(7)));
        let p = parse_filter("city:equals:Oslo", &columns()).unwrap();
        assert_eq!(p.value, Value::from("Oslo"));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(parse_filter("age:gt", &columns()).is_err());
        assert!(parse_filter(":gt:3", &columns()).is_err());
    }

    #[test]
    fn records_from_stdin() {
        let stdin = MockStdin::piped(r#"[{"id": 1}]"#);
        assert_eq!(read_records("-", &stdin).unwrap().len(), 1);
        assert!(read_records("-", &MockStdin::terminal()).is_err());
    }

    #[test]
    fn columns_infer_from_first_record() {
        let records = vec![Record::new().with("b", 1).with("a", "x")];
        let cols = resolve_columns(None, &records).unwrap();
        assert_eq!(cols.len(), 2);
        assert!(resolve_columns(None, &[]).unwrap().is_empty());
    }
}
