//! Single-column sorting.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::compare_values;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl Dir {
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// The other direction.
    pub fn toggled(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Dir,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: Dir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: Dir::Desc,
        }
    }

    /// Header-click transition: the same field flips direction, any other
    /// field starts ascending.
    pub fn next(current: Option<&SortKey>, field: &str) -> SortKey {
        match current {
            Some(key) if key.field == field => SortKey {
                field: key.field.clone(),
                direction: key.direction.toggled(),
            },
            _ => SortKey::asc(field),
        }
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.direction
            .apply(compare_values(a.get(&self.field), b.get(&self.field)))
    }

    /// Sorts record indices in place.
    ///
    /// The sort is stable: records whose values compare equal keep their
    /// relative input order in both directions.
    pub fn sort_indices(&self, records: &[Record], indices: &mut [usize]) {
        indices.sort_by(|&a, &b| self.compare(&records[a], &records[b]));
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("name", "Bob").with("age", 30),
            Record::new().with("name", "Al").with("age", 25),
            Record::new().with("name", "Cy").with("age", 30),
        ]
    }

    fn names(records: &[Record], indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| records[i].get("name").to_string())
            .collect()
    }

    #[test]
    fn next_toggles_same_field() {
        let first = SortKey::next(None, "age");
        assert_eq!(first, SortKey::asc("age"));

        let second = SortKey::next(Some(&first), "age");
        assert_eq!(second, SortKey::desc("age"));

        let third = SortKey::next(Some(&second), "age");
        assert_eq!(third, SortKey::asc("age"));
    }

    #[test]
    fn next_resets_for_new_field() {
        let current = SortKey::desc("age");
        assert_eq!(SortKey::next(Some(&current), "name"), SortKey::asc("name"));
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let records = people();
        let mut indices: Vec<usize> = (0..records.len()).collect();

        SortKey::asc("age").sort_indices(&records, &mut indices);
        assert_eq!(names(&records, &indices), ["Al", "Bob", "Cy"]);

        let mut indices: Vec<usize> = (0..records.len()).collect();
        SortKey::desc("age").sort_indices(&records, &mut indices);
        assert_eq!(names(&records, &indices), ["Bob", "Cy", "Al"]);
    }

    #[test]
    fn nulls_sort_last_ascending() {
        let records = vec![
            Record::new().with("name", "none"),
            Record::new().with("name", "x").with("age", 1),
        ];
        let mut indices = vec![0, 1];
        SortKey::asc("age").sort_indices(&records, &mut indices);
        assert_eq!(indices, [1, 0]);
    }

    #[test]
    fn dir_helpers() {
        assert_eq!(Dir::Asc.toggled(), Dir::Desc);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortKey::desc("age").to_string(), "age desc");
    }
}
