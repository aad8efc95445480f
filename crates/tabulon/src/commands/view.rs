//! `tabulon view`: one page of records.

use anyhow::{Context, Result};
use serde::Serialize;
use tabulon_table::{DataTable, Record, RowKey, TableSnapshot};

use crate::cli::ViewArgs;
use crate::config::Settings;
use crate::env::Environment;
use crate::load::{parse_filter, read_records, resolve_columns};
use crate::output::OutputMode;
use crate::render::render_table;
use crate::serialize::{serialize_structured, write_csv};

/// Structured output of `view`.
///
/// `page` is zero-based here, as in the table engine; `--page` and the text
/// footer count from one.
#[derive(Debug, Serialize)]
pub struct ViewReport {
    #[serde(flatten)]
    pub snapshot: TableSnapshot,
    /// Selected records present in the input, in selection order.
    pub selection: Vec<Record>,
}

/// Builds the table from the arguments, in the order search, filters,
/// sort, page size, page, selection.
pub fn build_table(args: &ViewArgs, settings: &Settings, env: &Environment) -> Result<DataTable> {
    let mut records = read_records(&args.records, env.stdin)?;
    let columns_path = args.columns.as_deref().or(settings.columns.as_deref());
    let columns = resolve_columns(columns_path, &records)?;
    for record in &mut records {
        record.coerce(&columns);
    }

    let mut config = settings.table.clone();
    if let Some(key) = args.key.as_ref().or(settings.key.as_ref()) {
        config = config.key_field(key.clone());
    }
    if args.all {
        config.paginated = false;
    }

    let filters = args
        .filters
        .iter()
        .map(|arg| parse_filter(arg, &columns))
        .collect::<Result<Vec<_>>>()?;

    let mut table = DataTable::new(columns, records, config).context("invalid table setup")?;
    table.on_sort(|key| log::info!("sorted by {key}"));
    table.on_filter(|filters| log::info!("{} filters active", filters.len()));
    table.on_selection_change(|keys| log::info!("{} rows selected", keys.len()));

    if let Some(term) = &args.search {
        table.set_search_term(term.as_str());
    }
    for predicate in filters {
        table.add_filter(predicate);
    }
    for field in &args.sorts {
        if table.column(field).is_some_and(|c| !c.sortable) {
            log::warn!("column '{field}' is not sortable, ignoring --sort");
            continue;
        }
        table.try_set_sort(field)?;
    }
    if let Some(size) = args.page_size {
        table.set_page_size(size as usize)?;
    }
    if let Some(page) = args.page {
        table.set_page(page as usize - 1);
        if table.page_range().is_empty() && table.total_count() > 0 {
            log::warn!(
                "page {page} is past the last page ({})",
                table.total_pages()
            );
        }
    }
    for key in &args.selects {
        table.toggle_key(RowKey::from(key.as_str()));
    }
    if args.select_page {
        table.select_all(true);
    }
    Ok(table)
}

pub fn run(
    args: &ViewArgs,
    settings: &Settings,
    mode: OutputMode,
    env: &Environment,
) -> Result<String> {
    let table = build_table(args, settings, env)?;

    let out = match mode {
        OutputMode::Csv => {
            let headers: Vec<&str> = table.columns().iter().map(|c| c.label.as_str()).collect();
            let rows = table
                .visible_rows()
                .into_iter()
                .map(|r| table.columns().iter().map(|c| c.cell(r)).collect::<Vec<String>>());
            write_csv(&headers, rows)?
        }
        OutputMode::Json | OutputMode::Yaml => {
            let report = ViewReport {
                snapshot: table.snapshot(),
                selection: table.selection().into_iter().cloned().collect(),
            };
            serialize_structured(&report, mode)?
        }
        OutputMode::Text | OutputMode::Auto => render_table(&table),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MockEnv, MockStdin};
    use clap::Parser;

    const PEOPLE: &str = r#"[
        {"id": 1, "name": "Bob", "age": 30},
        {"id": 2, "name": "Al", "age": 25},
        {"id": 3, "name": "Cy", "age": "41"}
    ]"#;

    fn view_args(argv: &[&str]) -> ViewArgs {
        let mut full = vec!["tabulon", "view"];
        full.extend_from_slice(argv);
        match crate::cli::Cli::parse_from(full).command {
            crate::cli::Command::View(args) => args,
            _ => unreachable!(),
        }
    }

    fn build(argv: &[&str]) -> DataTable {
        let env = MockEnv::new();
        let stdin = MockStdin::piped(PEOPLE);
        let environment = Environment::new(&env, &stdin);
        build_table(&view_args(argv), &Settings::default(), &environment).unwrap()
    }

    fn names(table: &DataTable) -> Vec<String> {
        table
            .visible_rows()
            .iter()
            .map(|r| r.get("name").to_text().unwrap_or_default())
            .collect()
    }

    #[test]
    fn repeated_sort_flips_direction() {
        assert_eq!(names(&build(&["--sort", "age"])), ["Al", "Bob", "Cy"]);
        assert_eq!(names(&build(&["--sort", "age", "--sort", "age"])), ["Cy", "Bob", "Al"]);
    }

    #[test]
    fn pages_count_from_one() {
        let table = build(&["--page-size", "2", "--page", "2"]);
        assert_eq!(table.page(), 1);
        assert_eq!(names(&table), ["Cy"]);
    }

    #[test]
    fn all_disables_paging() {
        let table = build(&["--page-size", "1", "--all"]);
        assert_eq!(table.visible_rows().len(), 3);
    }

    #[test]
    fn filters_and_selection() {
        let table = build(&["-f", "age:gt:26", "--select", "3", "--select", "2"]);
        assert_eq!(names(&table), ["Bob", "Cy"]);
        let selected: Vec<&str> = table.selected_keys().iter().map(RowKey::as_str).collect();
        assert_eq!(selected, ["3", "2"]);
    }

    #[test]
    fn select_page_checks_visible_rows() {
        let table = build(&["--page-size", "2", "--select-page", "--key", "name"]);
        let selected: Vec<&str> = table.selected_keys().iter().map(RowKey::as_str).collect();
        assert_eq!(selected, ["Bob", "Al"]);
    }

    #[test]
    fn bad_filter_is_an_error() {
        let env = MockEnv::new();
        let stdin = MockStdin::piped(PEOPLE);
        let environment = Environment::new(&env, &stdin);
        let args = view_args(&["-f", "age"]);
        assert!(build_table(&args, &Settings::default(), &environment).is_err());
    }

    #[test]
    fn unknown_sort_field_is_an_error() {
        let env = MockEnv::new();
        let stdin = MockStdin::piped(PEOPLE);
        let environment = Environment::new(&env, &stdin);
        let args = view_args(&["--sort", "nope"]);
        let err = build_table(&args, &Settings::default(), &environment).unwrap_err();
        assert_eq!(err.to_string(), "unknown column 'nope'");
    }
}
