//! Tabulon table - client-side tabular data engine.
//!
//! The engine keeps an in-memory record collection and the view state of a
//! table UI: free-text search, filter predicates, a single sort key,
//! pagination and row selection. It supports:
//!
//! - Open records: field name to value maps, with values that are text,
//!   numbers, timestamps, booleans or null
//! - Column descriptors deciding what is searched, sorted and displayed
//! - Filter predicates combined with AND
//! - Stable single-column sorting that toggles like a header click
//! - Keyed selection that survives page changes and refetches
//!
//! # Quick Start
//!
//! ```rust
//! use tabulon_table::{Column, DataTable, Record, TableConfig};
//!
//! let columns = vec![Column::new("name", "Name"), Column::new("age", "Age")];
//! let records = vec![
//!     Record::new().with("id", 1).with("name", "Bob").with("age", 30),
//!     Record::new().with("id", 2).with("name", "Al").with("age", 25),
//! ];
//!
//! let mut table = DataTable::new(columns, records, TableConfig::new().page_size(1)).unwrap();
//! table.set_sort("age");
//!
//! assert_eq!(table.total_pages(), 2);
//! assert_eq!(table.visible_rows()[0].get("name").to_string(), "Al");
//! ```
//!
//! # View Semantics
//!
//! The visible rows are derived in a fixed order:
//!
//! ```text
//! visible = page(sort(filter(search(records))))
//! ```
//!
//! - **Search** matches when any filterable column's text contains the term,
//!   ignoring case
//! - **Filters** must all match; unknown operators let every row through
//! - **Sort** is stable; nulls come last in ascending order
//! - **Page** is 0-based and never clamped automatically
//!
//! # Operators
//!
//! | Operator | Semantics |
//! |----------|-----------|
//! | `equals` | Same value kind and equal value |
//! | `contains`, `startsWith`, `endsWith` | Case-insensitive on the text form |
//! | `greaterThan`, `lessThan` | Numeric; non-numeric operands fail |

mod catalog;
mod column;
mod error;
mod op;
mod ordering;
mod predicate;
mod record;
mod table;
mod value;

pub use catalog::{operators_for, FilterCatalog, FilterField, OperatorChoice};
pub use column::{infer_columns, Align, Column, ColumnKind, Formatter, SelectOption};
pub use error::{Result, TableError};
pub use op::FilterOp;
pub use ordering::{Dir, SortKey};
pub use predicate::{matches_all, matches_search, Predicate};
pub use record::{records_from_json, KeyFn, Record, RowKey};
pub use table::{DataTable, SelectAllState, TableConfig, TableSnapshot, DEFAULT_PAGE_SIZE_OPTIONS};
pub use value::{compare_values, Number, Timestamp, Value};
