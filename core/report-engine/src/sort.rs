//! FILENAME: core/report-engine/src/sort.rs
//! Sort/Rank Stage - multi-key stable ordering of raw or aggregated rows.
//!
//! Rows are decorated once with their sort cells, sorted with the original
//! index as the final tie-break, then undecorated. The index tie-break makes
//! the ordering total, so equal rows never swap.

use std::cmp::Ordering;

use engine::{Record, RecordRef, Value};
use smallvec::SmallVec;

use crate::catalog::FieldCatalog;
use crate::definition::{SortDirection, SortKey, SOURCE_COUNT_FIELD};
use crate::engine::AggregatedRow;

/// A pre-coerced sort value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortCell {
    Number(f64),
    Text(String),
}

impl SortCell {
    pub fn from_value(value: &Value) -> Self {
        match value.as_number() {
            Some(n) => SortCell::Number(n),
            None => SortCell::Text(value.to_display_string()),
        }
    }

    /// Numeric when both sides are numbers, lexicographic when both are text.
    /// Mixed pairs put numbers first: string-comparing them would make
    /// `5 < 10 < "10abc" < "5"` a cycle.
    fn compare(&self, other: &SortCell) -> Ordering {
        match (self, other) {
            (SortCell::Number(a), SortCell::Number(b)) => a.total_cmp(b),
            (SortCell::Text(a), SortCell::Text(b)) => a.cmp(b),
            (SortCell::Number(_), SortCell::Text(_)) => Ordering::Less,
            (SortCell::Text(_), SortCell::Number(_)) => Ordering::Greater,
        }
    }
}

/// Anything the sort stage can order.
pub trait Sortable {
    fn sort_cell(&self, field: &str) -> SortCell;
}

impl Sortable for Record {
    fn sort_cell(&self, field: &str) -> SortCell {
        SortCell::from_value(self.value(field))
    }
}

impl Sortable for RecordRef {
    fn sort_cell(&self, field: &str) -> SortCell {
        self.as_ref().sort_cell(field)
    }
}

impl Sortable for AggregatedRow {
    /// Group key first, then metrics, then the `sourceCount` pseudo-field.
    fn sort_cell(&self, field: &str) -> SortCell {
        if let Some(value) = self.key(field) {
            return SortCell::from_value(value);
        }
        match self.numeric(field) {
            Some(n) => SortCell::Number(n),
            None => SortCell::Text(String::new()),
        }
    }
}

type Decorated = (SmallVec<[SortCell; 2]>, usize);

/// Returns `rows` ordered by `sort_by`. No keys means input order.
pub fn sort_rows<T: Sortable + Clone>(rows: &[T], sort_by: &[SortKey]) -> Vec<T> {
    if sort_by.is_empty() {
        return rows.to_vec();
    }

    let mut decorated: Vec<Decorated> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (sort_by.iter().map(|k| row.sort_cell(&k.field)).collect(), idx))
        .collect();

    decorated.sort_unstable_by(|(a_cells, a_idx), (b_cells, b_idx)| {
        for ((a, b), key) in a_cells.iter().zip(b_cells.iter()).zip(sort_by) {
            let ord = a.compare(b);
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a_idx.cmp(b_idx)
    });

    decorated.into_iter().map(|(_, idx)| rows[idx].clone()).collect()
}

/// Drops sort keys whose field is not in the catalog. `sourceCount` is
/// always kept since aggregated rows carry it.
pub fn known_sort_keys(sort_by: &[SortKey], catalog: &FieldCatalog) -> Vec<SortKey> {
    sort_by
        .iter()
        .filter(|k| k.field == SOURCE_COUNT_FIELD || catalog.contains(&k.field))
        .cloned()
        .collect()
}

/// Sorts raw records, skipping keys the catalog does not know. A sort on a
/// field that no longer exists leaves the input order untouched.
pub fn sort_records(records: &[RecordRef], sort_by: &[SortKey], catalog: &FieldCatalog) -> Vec<RecordRef> {
    sort_rows(records, &known_sort_keys(sort_by, catalog))
}
