//! FILENAME: core/report-engine/src/compare.rs
//! Comparative Analysis - current vs reference period, per dimension.
//!
//! Both sides are reduced to (dimension -> metric) in first-seen order, then
//! full-outer-joined: dimensions held by only one side are kept with zero on
//! the other. Rows sharing a dimension value on one side are summed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::engine::AggregatedRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub dimension_key: String,
    pub current: f64,
    pub previous: f64,
    pub change_percent: f64,
}

impl ComparisonRow {
    pub fn new(dimension_key: impl Into<String>, current: f64, previous: f64) -> Self {
        ComparisonRow {
            dimension_key: dimension_key.into(),
            current,
            previous,
            change_percent: change_percent(current, previous),
        }
    }
}

/// Percentage change from `previous` to `current`. A zero baseline reports
/// 100 for any non-zero current value and 0 when both are zero.
pub fn change_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Dimension -> summed metric, in first-seen order.
struct DimensionTotals {
    index: FxHashMap<String, usize>,
    entries: Vec<(String, f64)>,
}

impl DimensionTotals {
    fn collect(rows: &[AggregatedRow], dimension: &str, metric: &str) -> Self {
        let mut totals = DimensionTotals {
            index: FxHashMap::default(),
            entries: Vec::new(),
        };
        for row in rows {
            let key = row.key(dimension).map(|v| v.to_display_string()).unwrap_or_default();
            let value = row.numeric(metric).unwrap_or(0.0);
            match totals.index.get(&key) {
                Some(&idx) => totals.entries[idx].1 += value,
                None => {
                    totals.index.insert(key.clone(), totals.entries.len());
                    totals.entries.push((key, value));
                }
            }
        }
        totals
    }

    fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&idx| self.entries[idx].1)
    }
}

/// Joins current and previous aggregates on `dimension` and reports the
/// change of `metric`. Output follows the current rows' order, then any
/// previous-only dimensions in their order.
pub fn compare(
    current: &[AggregatedRow],
    previous: &[AggregatedRow],
    dimension: &str,
    metric: &str,
) -> Vec<ComparisonRow> {
    let current_totals = DimensionTotals::collect(current, dimension, metric);
    let previous_totals = DimensionTotals::collect(previous, dimension, metric);

    let mut rows: Vec<ComparisonRow> = current_totals
        .entries
        .iter()
        .map(|(key, value)| ComparisonRow::new(key.clone(), *value, previous_totals.get(key).unwrap_or(0.0)))
        .collect();

    rows.extend(
        previous_totals
            .entries
            .iter()
            .filter(|(key, _)| current_totals.get(key).is_none())
            .map(|(key, value)| ComparisonRow::new(key.clone(), 0.0, *value)),
    );

    rows
}
