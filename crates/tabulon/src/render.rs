//! Plain-text table rendering.

use tabulon_table::{Align, Column, DataTable, Dir, FilterCatalog, SelectAllState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells wider than this are cut with an ellipsis.
pub const MAX_CELL_WIDTH: usize = 48;

const GAP: &str = "  ";

/// Shown instead of rows when nothing passes search and filters.
pub const EMPTY_MESSAGE: &str = "No data available";

/// Renders the current page as an aligned table with a summary footer.
///
/// ```text
/// [-]  Name   Age ▲
/// ---  -----  -----
/// [x]  Al        25
/// [ ]  Bob       30
///
/// Showing 1–2 of 2 · page 1 of 1 · 1 selected
/// ```
pub fn render_table(table: &DataTable) -> String {
    let columns = table.columns();
    let rows = table.visible_rows();
    let selectable = table.config().selectable;

    let headers: Vec<String> = columns.iter().map(|c| header_label(table, c)).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| truncate_to_width(&c.cell(r), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let content = cells.iter().map(|row| row[i].width()).max().unwrap_or(0);
            headers[i]
                .width()
                .max(content)
                .max(c.width.unwrap_or(0))
        })
        .collect();

    let mut lines = Vec::new();

    let mut header = Vec::new();
    let mut rule = Vec::new();
    if selectable {
        header.push(select_all_marker(table.select_all_state()).to_string());
        rule.push("---".to_string());
    }
    for (i, column) in columns.iter().enumerate() {
        // Headers follow the column alignment so sort markers line up.
        header.push(pad(&headers[i], widths[i], column.align));
        rule.push("-".repeat(widths[i]));
    }
    lines.push(join_line(&header));
    lines.push(join_line(&rule));

    for (record, row) in rows.iter().zip(&cells) {
        let mut line = Vec::new();
        if selectable {
            let marker = if table.is_selected(record) { "[x]" } else { "[ ]" };
            line.push(marker.to_string());
        }
        for (i, column) in columns.iter().enumerate() {
            line.push(pad(&row[i], widths[i], column.align));
        }
        lines.push(join_line(&line));
    }

    lines.push(String::new());
    lines.extend(summary_lines(table));
    lines.join("\n")
}

/// Footer lines: position, page, selection, then active search and filters.
pub fn summary_lines(table: &DataTable) -> Vec<String> {
    let mut lines = Vec::new();
    let total = table.total_count();
    let range = table.page_range();

    let mut parts = Vec::new();
    if total == 0 {
        parts.push(EMPTY_MESSAGE.to_string());
    } else if range.is_empty() {
        parts.push(format!("No rows on this page ({total} total)"));
    } else {
        parts.push(format!("Showing {}–{} of {}", range.start + 1, range.end, total));
    }
    if table.config().paginated && total > 0 {
        parts.push(format!(
            "page {} of {}",
            table.page() + 1,
            table.total_pages()
        ));
    }
    let selected = table.selected_keys().len();
    if selected > 0 {
        parts.push(format!("{selected} selected"));
    }
    lines.push(parts.join(" · "));

    if !table.search_term().is_empty() {
        lines.push(format!("Search: {}", table.search_term()));
    }
    if !table.filters().is_empty() {
        let catalog = FilterCatalog::from_columns(table.columns());
        let labels: Vec<String> = table.filters().iter().map(|p| catalog.label_for(p)).collect();
        lines.push(format!("Filters: {}", labels.join(", ")));
    }
    lines
}

fn header_label(table: &DataTable, column: &Column) -> String {
    match table.sort() {
        Some(key) if key.field == column.id => {
            let arrow = match key.direction {
                Dir::Asc => '▲',
                Dir::Desc => '▼',
            };
            format!("{} {}", column.label, arrow)
        }
        _ => column.label.clone(),
    }
}

fn select_all_marker(state: SelectAllState) -> &'static str {
    match state {
        SelectAllState::Unchecked => "[ ]",
        SelectAllState::Checked => "[x]",
        SelectAllState::Indeterminate => "[-]",
    }
}

fn join_line(cells: &[String]) -> String {
    cells.join(GAP).trim_end().to_string()
}

/// Pads `text` to `width` display columns.
pub fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(text.width());
    match align {
        Align::Left => format!("{text}{}", " ".repeat(fill)),
        Align::Right => format!("{}{text}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

/// Truncates a string to fit within a maximum display width, adding an
/// ellipsis when it does not fit.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
