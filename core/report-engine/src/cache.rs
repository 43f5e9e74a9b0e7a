//! FILENAME: core/report-engine/src/cache.rs
//! Group Cache - the internal representation used while aggregating.
//!
//! The cache is designed for:
//! - A single pass over the filtered records (O(n))
//! - O(1) group lookup through a hash index keyed by the composite group key
//! - Group discovery order preserved for deterministic output
//!
//! Architecture:
//! - Each group is a slot in a Vec; the index maps composite keys to slots
//! - Each slot holds one accumulator per aggregated field
//! - Grand totals are produced by merging every slot's accumulators

use engine::{Record, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::definition::{AggregationType, FieldId};

// ============================================================================
// GROUP KEY
// ============================================================================

/// Composite key: the string-coerced value of each group-by field, in
/// group-by order. Most reports group by one or two dimensions.
pub type GroupKey = SmallVec<[String; 4]>;

/// Builds the composite key for a record by iterating `group_by` in order.
pub fn group_key_for(record: &Record, group_by: &[FieldId]) -> GroupKey {
    group_by
        .iter()
        .map(|field| record.value(field).to_display_string())
        .collect()
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for computing aggregates incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateAccumulator {
    pub sum: f64,
    /// Records seen, numeric or not.
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record's value into the accumulator.
    pub fn add(&mut self, value: &Value) {
        self.count += 1;
        if let Some(n) = value.as_number() {
            self.sum += n;
            self.min = Some(self.min.map_or(n, |m| m.min(n)));
            self.max = Some(self.max.map_or(n, |m| m.max(n)));
        }
    }

    /// Computes the final aggregate. `source_count` is the number of records
    /// folded into the owning group; averages divide by it.
    pub fn compute(&self, aggregation: AggregationType, source_count: usize) -> f64 {
        match aggregation {
            AggregationType::Count => source_count as f64,
            AggregationType::Sum => self.sum,
            AggregationType::Average => {
                if source_count > 0 {
                    self.sum / source_count as f64
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
        }
    }

    /// Merges another accumulator into this one.
    pub fn merge(&mut self, other: &AggregateAccumulator) {
        if other.count == 0 {
            return;
        }
        self.sum += other.sum;
        self.count += other.count;
        if let Some(other_min) = other.min {
            self.min = Some(self.min.map_or(other_min, |m| m.min(other_min)));
        }
        if let Some(other_max) = other.max {
            self.max = Some(self.max.map_or(other_max, |m| m.max(other_max)));
        }
    }
}

// ============================================================================
// GROUP TABLE
// ============================================================================

/// One discovered group.
#[derive(Debug, Clone)]
pub struct GroupSlot {
    /// First-seen original value of each group-by field.
    pub key_values: Vec<Value>,
    /// One accumulator per aggregated field.
    pub accumulators: Vec<AggregateAccumulator>,
    pub source_count: usize,
}

/// All groups for one aggregation run, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    index: FxHashMap<GroupKey, usize>,
    slots: Vec<GroupSlot>,
}

impl GroupTable {
    /// Partitions `records` by `group_by` and folds each record's value for
    /// every field in `value_fields` into its group.
    ///
    /// An empty `group_by` always yields exactly one implicit group, even when
    /// no records are folded into it.
    pub fn build<'r, I>(records: I, group_by: &[FieldId], value_fields: &[&str]) -> Self
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut table = GroupTable::default();
        if group_by.is_empty() {
            table.index.insert(GroupKey::new(), 0);
            table.slots.push(GroupSlot {
                key_values: Vec::new(),
                accumulators: vec![AggregateAccumulator::new(); value_fields.len()],
                source_count: 0,
            });
        }

        for record in records {
            let key = group_key_for(record, group_by);
            let slot_idx = match table.index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = table.slots.len();
                    table.slots.push(GroupSlot {
                        key_values: group_by.iter().map(|f| record.value(f).clone()).collect(),
                        accumulators: vec![AggregateAccumulator::new(); value_fields.len()],
                        source_count: 0,
                    });
                    table.index.insert(key, idx);
                    idx
                }
            };

            let slot = &mut table.slots[slot_idx];
            slot.source_count += 1;
            for (acc, field) in slot.accumulators.iter_mut().zip(value_fields) {
                acc.add(record.value(field));
            }
        }

        table
    }

    pub fn slots(&self) -> &[GroupSlot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<GroupSlot> {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Merges every group into a single grand-total slot. `None` when no
    /// records were folded.
    pub fn grand_total(&self) -> Option<GroupSlot> {
        let first = self.slots.first()?;
        if self.slots.iter().all(|slot| slot.source_count == 0) {
            return None;
        }
        let mut total = GroupSlot {
            key_values: Vec::new(),
            accumulators: vec![AggregateAccumulator::new(); first.accumulators.len()],
            source_count: 0,
        };
        for slot in &self.slots {
            total.source_count += slot.source_count;
            for (acc, other) in total.accumulators.iter_mut().zip(&slot.accumulators) {
                acc.merge(other);
            }
        }
        Some(total)
    }
}
