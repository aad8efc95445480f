//! Property-based tests for the table engine using proptest.

use proptest::prelude::*;
use tabulon_table::{Column, DataTable, Dir, Predicate, Record, TableConfig};

// ============================================================================
// Test helpers
// ============================================================================

fn columns() -> Vec<Column> {
    vec![Column::new("name", "Name"), Column::new("score", "Score")]
}

fn record_strategy() -> impl Strategy<Value = (String, i64)> {
    ("[a-z]{1,8}", -1000i64..1000)
}

fn build(rows: &[(String, i64)], page_size: usize) -> DataTable {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, (name, score))| {
            Record::new()
                .with("id", i as i64)
                .with("name", name.as_str())
                .with("score", *score)
        })
        .collect();
    DataTable::new(columns(), records, TableConfig::new().page_size(page_size)).unwrap()
}

fn ids(rows: &[&Record]) -> Vec<String> {
    rows.iter().map(|r| r.get("id").to_string()).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filtering never fabricates or duplicates records.
    #[test]
    fn filter_is_subset(
        rows in prop::collection::vec(record_strategy(), 0..60),
        threshold in -1000i64..1000,
        needle in "[a-z]{0,2}",
    ) {
        let mut table = build(&rows, 10);
        table.add_filter(Predicate::greater_than("score", threshold));
        table.set_search_term(needle);

        let filtered = ids(&table.filtered_rows());
        let mut unique = filtered.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), filtered.len());
        prop_assert!(filtered.len() <= rows.len());
        for id in &filtered {
            let index: usize = id.parse().unwrap();
            prop_assert!(rows[index].1 > threshold);
        }
    }

    /// Pages never exceed the page size and together cover the filtered view.
    #[test]
    fn pages_partition_filtered_rows(
        rows in prop::collection::vec(record_strategy(), 0..60),
        page_size in 1usize..12,
    ) {
        let mut table = build(&rows, page_size);
        table.set_sort("score");

        let mut seen = Vec::new();
        for page in 0..table.total_pages() {
            table.set_page(page);
            let visible = table.visible_rows();
            prop_assert!(visible.len() <= page_size);
            seen.extend(ids(&visible));
        }
        prop_assert_eq!(seen.len(), table.total_count());
        prop_assert_eq!(seen, ids(&table.filtered_rows()));
    }

    /// Sorting twice by the same key in the same direction changes nothing.
    #[test]
    fn sort_is_idempotent(rows in prop::collection::vec(record_strategy(), 0..60)) {
        let mut once = build(&rows, 100);
        once.set_sort("score");

        let mut twice = build(&rows, 100);
        twice.set_sort("score");
        twice.set_records(twice.records().to_vec());

        prop_assert_eq!(ids(&once.filtered_rows()), ids(&twice.filtered_rows()));
    }

    /// Equal sort values keep their input order.
    #[test]
    fn sort_is_stable(rows in prop::collection::vec(record_strategy(), 0..60)) {
        let mut table = build(&rows, 100);
        table.set_sort("score");

        let sorted = table.filtered_rows();
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (sa, sb) = (a.get("score").to_number(), b.get("score").to_number());
            prop_assert!(sa <= sb);
            if sa == sb {
                let (ia, ib) = (a.get("id").to_number(), b.get("id").to_number());
                prop_assert!(ia < ib);
            }
        }
    }

    /// Two header clicks flip the direction, a third restores it.
    #[test]
    fn sort_toggle_round_trip(field in prop::sample::select(vec!["name", "score"])) {
        let mut table = build(&[], 10);
        table.set_sort(field);
        prop_assert_eq!(table.sort().unwrap().direction, Dir::Asc);
        table.set_sort(field);
        prop_assert_eq!(table.sort().unwrap().direction, Dir::Desc);
        table.set_sort(field);
        prop_assert_eq!(table.sort().unwrap().direction, Dir::Asc);
    }
}
