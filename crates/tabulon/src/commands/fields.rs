//! `tabulon fields`: the filter catalog.

use anyhow::{bail, Result};
use serde::Serialize;
use tabulon_table::{infer_columns, Align, ColumnKind, FilterCatalog, OperatorChoice, SelectOption};

use crate::cli::FieldsArgs;
use crate::config::Settings;
use crate::env::Environment;
use crate::load::{read_columns, read_records};
use crate::output::OutputMode;
use crate::render::pad;
use crate::serialize::write_csv;

/// A filterable field with its operator menu resolved.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub id: String,
    pub label: String,
    pub kind: ColumnKind,
    pub operators: Vec<OperatorChoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

pub fn catalog(args: &FieldsArgs, settings: &Settings, env: &Environment) -> Result<FilterCatalog> {
    let columns = match (&args.columns, &args.records) {
        (Some(path), _) => read_columns(path)?,
        (None, Some(source)) => {
            let records = read_records(source, env.stdin)?;
            records.first().map(infer_columns).unwrap_or_default()
        }
        (None, None) => match &settings.columns {
            Some(path) => read_columns(path)?,
            None => bail!("no columns to describe; pass --columns FILE or --records FILE"),
        },
    };
    Ok(FilterCatalog::from_columns(&columns))
}

pub fn run(
    args: &FieldsArgs,
    settings: &Settings,
    mode: OutputMode,
    env: &Environment,
) -> Result<String> {
    let catalog = catalog(args, settings, env)?;
    let report: Vec<FieldReport> = catalog
        .fields()
        .iter()
        .map(|f| FieldReport {
            id: f.id.clone(),
            label: f.label.clone(),
            kind: f.kind,
            operators: f.operators(),
            options: f.options.clone(),
        })
        .collect();

    if mode == OutputMode::Csv {
        let rows = report.iter().map(|f| {
            vec![
                f.id.clone(),
                f.label.clone(),
                f.kind.to_string(),
                operator_names(&f.operators).join(" "),
            ]
        });
        return Ok(write_csv(&["field", "label", "kind", "operators"], rows)?);
    }
    Ok(super::emit(mode, &report, |fields| render_fields(fields))?)
}

fn operator_names(operators: &[OperatorChoice]) -> Vec<&str> {
    operators.iter().map(|o| o.operator.as_str()).collect()
}

fn render_fields(fields: &[FieldReport]) -> String {
    if fields.is_empty() {
        return "No filterable fields".to_string();
    }
    let id_width = fields.iter().map(|f| f.id.len()).max().unwrap_or(0).max(5);
    let kind_width = fields
        .iter()
        .map(|f| f.kind.as_str().len())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines = vec![format!(
        "{}  {}  OPERATORS",
        pad("FIELD", id_width, Align::Left),
        pad("KIND", kind_width, Align::Left)
    )];
    for field in fields {
        lines.push(format!(
            "{}  {}  {}",
            pad(&field.id, id_width, Align::Left),
            pad(field.kind.as_str(), kind_width, Align::Left),
            operator_names(&field.operators).join(", ")
        ));
        if !field.options.is_empty() {
            let options: Vec<String> = field
                .options
                .iter()
                .map(|o| format!("{}={}", o.value, o.label))
                .collect();
            lines.push(format!("{}  options: {}", " ".repeat(id_width), options.join(", ")));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MockEnv, MockStdin};

    fn environment_run(args: FieldsArgs, mode: OutputMode) -> Result<String> {
        let env = MockEnv::new();
        let stdin = MockStdin::piped(r#"[{"name": "Bob", "age": 30}]"#);
        let environment = Environment::new(&env, &stdin);
        run(&args, &Settings::default(), mode, &environment)
    }

    #[test]
    fn inferred_fields_as_text() {
        let args = FieldsArgs {
            columns: None,
            records: Some("-".into()),
        };
        let out = environment_run(args, OutputMode::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "FIELD  KIND    OPERATORS");
        assert_eq!(lines[1], "age    number  equals, greaterThan, lessThan");
        assert_eq!(lines[2], "name   text    contains, equals, startsWith, endsWith");
    }

    #[test]
    fn fields_as_csv() {
        let args = FieldsArgs {
            columns: None,
            records: Some("-".into()),
        };
        let out = environment_run(args, OutputMode::Csv).unwrap();
        assert!(out.starts_with("field,label,kind,operators\n"));
        assert!(out.contains("age,Age,number,equals greaterThan lessThan\n"));
    }

    #[test]
    fn select_options_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.yaml");
        std::fs::write(
            &path,
            "- id: status\n  label: Status\n  kind: select\n  options:\n    - { value: on, label: Active }\n    - { value: off, label: Away }\n- id: notes\n  label: Notes\n  filterable: false\n",
        )
        .unwrap();
        let args = FieldsArgs {
            columns: Some(path),
            records: None,
        };
        let out = environment_run(args, OutputMode::Text).unwrap();
        assert!(out.contains("status  select  equals"));
        assert!(out.contains("options: on=Active, off=Away"));
        assert!(!out.contains("notes"));
    }

    #[test]
    fn nothing_to_describe() {
        let args = FieldsArgs {
            columns: None,
            records: None,
        };
        assert!(environment_run(args, OutputMode::Text).is_err());
    }
}
