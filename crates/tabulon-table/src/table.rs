//! The table engine.
//!
//! [`DataTable`] owns a record collection plus the view state a table UI
//! keeps: search term, filters, sort key, page and selection. Every setter
//! recomputes the derived view before returning, so readers always see a
//! consistent snapshot.
//!
//! The view is derived in a fixed order:
//!
//! ```text
//! records → search → filters → sort → page
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::ordering::SortKey;
use crate::predicate::{matches_all, matches_search, Predicate};
use crate::record::{KeyFn, Record, RowKey};

/// Page sizes offered by the page-size selector.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

fn default_page_size() -> usize {
    10
}

fn default_page_size_options() -> Vec<usize> {
    DEFAULT_PAGE_SIZE_OPTIONS.to_vec()
}

fn default_true() -> bool {
    true
}

/// Table behaviour switches.
///
/// Disabled features turn the matching setters into logged no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// When off, every filtered row is visible at once.
    #[serde(default = "default_true")]
    pub paginated: bool,
    /// Row identity used by the selection set.
    #[serde(skip)]
    pub key: KeyFn,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            searchable: true,
            filterable: true,
            selectable: true,
            paginated: true,
            key: KeyFn::default(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        TableConfig::default()
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    /// Keys rows by the text of `field`.
    pub fn key_field(mut self, field: impl Into<String>) -> Self {
        self.key = KeyFn::field(field);
        self
    }

    pub fn key(mut self, key: KeyFn) -> Self {
        self.key = key;
        self
    }
}

/// State of the "select all on this page" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    Unchecked,
    Checked,
    /// Some, but not all, rows of the page are selected.
    Indeterminate,
}

type SortCallback = Box<dyn FnMut(&SortKey) + Send>;
type FilterCallback = Box<dyn FnMut(&[Predicate]) + Send>;
type SelectionCallback = Box<dyn FnMut(&[RowKey]) + Send>;

#[derive(Default)]
struct Callbacks {
    on_sort: Option<SortCallback>,
    on_filter: Option<FilterCallback>,
    on_selection_change: Option<SelectionCallback>,
}

/// A searchable, filterable, sortable, paginated and selectable table.
///
/// ```
/// use tabulon_table::{Column, DataTable, Predicate, Record, TableConfig};
///
/// let columns = vec![Column::new("name", "Name"), Column::new("age", "Age")];
/// let records = vec![
///     Record::new().with("id", 1).with("name", "Bob").with("age", 30),
///     Record::new().with("id", 2).with("name", "Al").with("age", 25),
/// ];
///
/// let mut table = DataTable::new(columns, records, TableConfig::default()).unwrap();
/// table.add_filter(Predicate::greater_than("age", 26));
///
/// let rows = table.visible_rows();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("name").to_string(), "Bob");
/// ```
pub struct DataTable {
    columns: Vec<Column>,
    records: Vec<Record>,
    config: TableConfig,
    search: String,
    filters: Vec<Predicate>,
    sort: Option<SortKey>,
    page: usize,
    page_size: usize,
    selected: Vec<RowKey>,
    /// Indices into `records` that survive search and filters, in sort order.
    view: Vec<usize>,
    callbacks: Callbacks,
}

impl DataTable {
    /// Creates a table.
    ///
    /// Fails when the configured page size is zero or two columns share an
    /// id.
    pub fn new(columns: Vec<Column>, records: Vec<Record>, config: TableConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(TableError::ZeroPageSize);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(TableError::DuplicateColumn(column.id.clone()));
            }
        }

        let mut table = DataTable {
            page_size: config.page_size,
            columns,
            records,
            config,
            search: String::new(),
            filters: Vec::new(),
            sort: None,
            page: 0,
            selected: Vec::new(),
            view: Vec::new(),
            callbacks: Callbacks::default(),
        };
        table.recompute();
        Ok(table)
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Called after every sort change with the new key.
    pub fn on_sort<F>(&mut self, f: F)
    where
        F: FnMut(&SortKey) + Send + 'static,
    {
        self.callbacks.on_sort = Some(Box::new(f));
    }

    /// Called after the filter list changes with the full list.
    pub fn on_filter<F>(&mut self, f: F)
    where
        F: FnMut(&[Predicate]) + Send + 'static,
    {
        self.callbacks.on_filter = Some(Box::new(f));
    }

    /// Called after the selection changes with the selected keys.
    pub fn on_selection_change<F>(&mut self, f: F)
    where
        F: FnMut(&[RowKey]) + Send + 'static,
    {
        self.callbacks.on_selection_change = Some(Box::new(f));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortKey> {
        self.sort.as_ref()
    }

    /// Current page, 0-based.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of records that pass search and filters.
    pub fn total_count(&self) -> usize {
        self.view.len()
    }

    /// `ceil(total_count / page_size)`; an unpaginated table has one page
    /// when it has any rows.
    pub fn total_pages(&self) -> usize {
        if !self.config.paginated {
            return usize::from(!self.view.is_empty());
        }
        self.view.len().div_ceil(self.page_size)
    }

    /// Positions, within the filtered and sorted view, of the visible rows.
    pub fn page_range(&self) -> Range<usize> {
        if !self.config.paginated {
            return 0..self.view.len();
        }
        let start = self.page.saturating_mul(self.page_size).min(self.view.len());
        let end = start.saturating_add(self.page_size).min(self.view.len());
        start..end
    }

    /// All records that pass search and filters, in sort order.
    pub fn filtered_rows(&self) -> Vec<&Record> {
        self.view.iter().map(|&i| &self.records[i]).collect()
    }

    /// Rows of the current page.
    pub fn visible_rows(&self) -> Vec<&Record> {
        self.view[self.page_range()]
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Replaces the record collection, as after a refetch.
    ///
    /// Search, filters, sort, page and selected keys are kept; selected rows
    /// reappear as selected when the new records carry the same keys.
    pub fn set_records(&mut self, records: Vec<Record>) {
        log::debug!("replacing {} records with {}", self.records.len(), records.len());
        self.records = records;
        self.recompute();
    }

    // ========================================================================
    // Search and filters
    // ========================================================================

    /// Sets the free-text search term and returns to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        if !self.config.searchable {
            log::warn!("search is disabled for this table; ignoring search term");
            return;
        }
        self.search = term.into();
        self.page = 0;
        self.recompute();
    }

    /// Appends a filter predicate and returns to the first page.
    pub fn add_filter(&mut self, predicate: Predicate) {
        if !self.config.filterable {
            log::warn!("filters are disabled for this table; ignoring '{predicate}'");
            return;
        }
        if !predicate.operator.is_known() {
            log::warn!("unknown filter operator '{}' matches every row", predicate.operator);
        }
        self.filters.push(predicate);
        self.filters_changed();
    }

    /// Removes the filter at `index`. Out-of-range indices are ignored.
    pub fn remove_filter(&mut self, index: usize) -> Option<Predicate> {
        if index >= self.filters.len() {
            return None;
        }
        let removed = self.filters.remove(index);
        self.filters_changed();
        Some(removed)
    }

    /// Removes every filter. The search term is kept.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.filters_changed();
    }

    /// Removes every filter and the search term.
    pub fn clear_all(&mut self) {
        self.search.clear();
        self.clear_filters();
    }

    fn filters_changed(&mut self) {
        self.page = 0;
        self.recompute();
        if let Some(f) = self.callbacks.on_filter.as_mut() {
            f(&self.filters);
        }
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Header click on `field`: toggles the direction when `field` is the
    /// active sort column, otherwise sorts ascending by `field`.
    ///
    /// The page is left unchanged.
    pub fn set_sort(&mut self, field: &str) {
        let key = SortKey::next(self.sort.as_ref(), field);
        log::debug!("sorting by {key}");
        self.sort = Some(key);
        self.recompute();
        if let (Some(f), Some(key)) = (self.callbacks.on_sort.as_mut(), self.sort.as_ref()) {
            f(key);
        }
    }

    /// Like [`set_sort`](Self::set_sort), but fails with
    /// [`TableError::UnknownColumn`] when no column has the id `field`.
    pub fn try_set_sort(&mut self, field: &str) -> Result<()> {
        if self.column(field).is_none() {
            return Err(TableError::UnknownColumn(field.to_string()));
        }
        self.set_sort(field);
        Ok(())
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Moves to page `page` (0-based). Pages past the end show no rows.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Moves back to the last page when the current one is past the end.
    pub fn clamp_page(&mut self) {
        let last = self.total_pages().saturating_sub(1);
        if self.page > last {
            self.page = last;
        }
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(TableError::ZeroPageSize);
        }
        if !self.config.page_size_options.contains(&page_size) {
            log::debug!("page size {page_size} is not one of the offered options");
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Checks or unchecks the page's select-all box.
    ///
    /// Checking replaces the selection with the current page's rows;
    /// unchecking clears the selection.
    pub fn select_all(&mut self, checked: bool) {
        if !self.config.selectable {
            log::warn!("selection is disabled for this table");
            return;
        }
        self.selected.clear();
        if checked {
            let key = &self.config.key;
            for &i in &self.view[self.page_range()] {
                if let Some(k) = key.key_of(&self.records[i]) {
                    // Rows sharing a key count once.
                    if !self.selected.contains(&k) {
                        self.selected.push(k);
                    }
                }
            }
        }
        self.selection_changed();
    }

    /// Adds the record to the selection, or removes it when already selected.
    ///
    /// Returns whether the record is selected afterwards. Records without a
    /// key cannot be selected.
    pub fn toggle_row(&mut self, record: &Record) -> bool {
        match self.config.key.key_of(record) {
            Some(key) => self.toggle_key(key),
            None => {
                log::warn!("record has no key and cannot be selected");
                false
            }
        }
    }

    /// Toggles selection by key.
    pub fn toggle_key(&mut self, key: RowKey) -> bool {
        if !self.config.selectable {
            log::warn!("selection is disabled for this table");
            return false;
        }
        let selected = if self.selected.contains(&key) {
            self.selected.retain(|k| *k != key);
            false
        } else {
            self.selected.push(key);
            true
        };
        self.selection_changed();
        selected
    }

    pub fn clear_selection(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.selected.clear();
        self.selection_changed();
    }

    pub fn is_selected(&self, record: &Record) -> bool {
        self.config
            .key
            .key_of(record)
            .is_some_and(|key| self.selected.contains(&key))
    }

    /// Selected keys, in selection order.
    pub fn selected_keys(&self) -> &[RowKey] {
        &self.selected
    }

    /// Records of the current collection whose keys are selected, in
    /// selection order. Keys with no matching record are skipped.
    pub fn selection(&self) -> Vec<&Record> {
        let key = &self.config.key;
        self.selected
            .iter()
            .filter_map(|selected| {
                self.records
                    .iter()
                    .find(|r| key.key_of(r).as_ref() == Some(selected))
            })
            .collect()
    }

    /// Checkbox state for the current page.
    pub fn select_all_state(&self) -> SelectAllState {
        let page = self.visible_rows();
        let on_page = page.iter().filter(|r| self.is_selected(r)).count();
        if on_page == 0 {
            SelectAllState::Unchecked
        } else if on_page == page.len() {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }

    fn selection_changed(&mut self) {
        log::debug!("{} rows selected", self.selected.len());
        if let Some(f) = self.callbacks.on_selection_change.as_mut() {
            f(&self.selected);
        }
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Owned copy of everything a renderer needs.
    pub fn snapshot(&self) -> TableSnapshot {
        let range = self.page_range();
        TableSnapshot {
            rows: self.visible_rows().into_iter().cloned().collect(),
            first_row: range.start,
            total_count: self.total_count(),
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages(),
            search: self.search.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            selected: self.selected.clone(),
            select_all: self.select_all_state(),
        }
    }

    fn recompute(&mut self) {
        let search = if self.config.searchable {
            self.search.as_str()
        } else {
            ""
        };
        let mut view: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_search(&self.columns, r, search))
            .filter(|(_, r)| matches_all(&self.filters, r))
            .map(|(i, _)| i)
            .collect();
        if let Some(sort) = &self.sort {
            sort.sort_indices(&self.records, &mut view);
        }
        log::debug!("{} of {} records in view", view.len(), self.records.len());
        self.view = view;
    }
}

impl fmt::Debug for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns.len())
            .field("records", &self.records.len())
            .field("search", &self.search)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

/// The rendered state of a table at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    /// Rows of the current page.
    pub rows: Vec<Record>,
    /// Position of the first visible row within the filtered view.
    pub first_row: usize,
    /// Rows passing search and filters.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub search: String,
    pub filters: Vec<Predicate>,
    pub sort: Option<SortKey>,
    pub selected: Vec<RowKey>,
    pub select_all: SelectAllState,
}
