//! FILENAME: core/report-engine/src/engine.rs
//! Report Engine - The calculation core that turns records into report rows.
//!
//! This module takes a ReportConfig (configuration), a FieldCatalog (schema)
//! and the raw records, and produces a ReportResult.
//!
//! Algorithm:
//! 1. Resolve the configuration against the catalog (unknown references dropped)
//! 2. Filter: one linear pass, AND-combined predicates
//! 3. Aggregate: one linear pass into a hashed group table
//! 4. Sort: decorate once, sort with an index tie-break
//! 5. Grand totals: merge of the group accumulators, no re-scan

use engine::{Record, RecordRef, Value};
use serde::{Deserialize, Serialize};

use crate::cache::{GroupSlot, GroupTable};
use crate::catalog::FieldCatalog;
use crate::compare::{compare, ComparisonRow};
use crate::definition::{
    AggregationType, FieldId, Filter, ReportConfig, ReportField, SortKey, SOURCE_COUNT_FIELD,
};
use crate::filter::apply_filters;
use crate::sort::sort_rows;
use crate::validation::{validate_for_generate, ValidationErrors};

// ============================================================================
// OUTPUT ROWS
// ============================================================================

/// The original value of one group-by field for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    pub field: FieldId,
    pub value: Value,
}

/// The aggregated value of one report field for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub field: FieldId,
    pub aggregation: AggregationType,
    pub value: f64,
}

/// One output row of the aggregation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    /// Group-by values, in group-by order.
    pub group_key: Vec<GroupValue>,
    /// Aggregated fields, in presentation order.
    pub metrics: Vec<MetricValue>,
    /// Number of raw records folded into this row.
    pub source_count: usize,
}

impl AggregatedRow {
    pub fn key(&self, field: &str) -> Option<&Value> {
        self.group_key.iter().find(|g| g.field == field).map(|g| &g.value)
    }

    pub fn metric(&self, field: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.field == field).map(|m| m.value)
    }

    /// Numeric view of a field: metric first, then the `sourceCount` pseudo-field.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        self.metric(field).or_else(|| {
            if field == SOURCE_COUNT_FIELD {
                Some(self.source_count as f64)
            } else {
                None
            }
        })
    }

    /// Group values joined for display ("Finance / Q1"). Empty for the
    /// whole-dataset summary row.
    pub fn label(&self) -> String {
        self.group_key
            .iter()
            .map(|g| g.value.to_display_string())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn from_slot(slot: GroupSlot, group_by: &[FieldId], fields: &[&ReportField]) -> Self {
        let source_count = slot.source_count;
        AggregatedRow {
            group_key: group_by
                .iter()
                .zip(slot.key_values)
                .map(|(field, value)| GroupValue { field: field.clone(), value })
                .collect(),
            metrics: fields
                .iter()
                .zip(&slot.accumulators)
                .map(|(field, acc)| MetricValue {
                    field: field.id.clone(),
                    aggregation: field.aggregation,
                    value: acc.compute(field.aggregation, source_count),
                })
                .collect(),
            source_count,
        }
    }
}

// ============================================================================
// AGGREGATION STAGE
// ============================================================================

/// Groups `records` by `group_by` and reduces every visible field with its
/// aggregation. Output is in group discovery order. An empty `group_by` always
/// gives a single whole-dataset row, with `source_count` 0 and zeroed metrics
/// when there are no records.
pub fn aggregate(records: &[RecordRef], group_by: &[FieldId], fields: &[ReportField]) -> Vec<AggregatedRow> {
    let visible = visible_in_order(fields);
    build_table(records, group_by, &visible)
        .into_slots()
        .into_iter()
        .map(|slot| AggregatedRow::from_slot(slot, group_by, &visible))
        .collect()
}

fn visible_in_order(fields: &[ReportField]) -> Vec<&ReportField> {
    let mut visible: Vec<&ReportField> = fields.iter().filter(|f| f.visible).collect();
    visible.sort_by_key(|f| f.order);
    visible
}

fn build_table(records: &[RecordRef], group_by: &[FieldId], visible: &[&ReportField]) -> GroupTable {
    let value_fields: Vec<&str> = visible.iter().map(|f| f.id.as_str()).collect();
    GroupTable::build(records.iter().map(|r| r.as_ref() as &Record), group_by, &value_fields)
}

// ============================================================================
// PIPELINE
// ============================================================================

/// A configuration with every reference checked against the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedQuery {
    pub filters: Vec<Filter>,
    pub group_by: Vec<FieldId>,
    pub fields: Vec<ReportField>,
    pub sort_by: Vec<SortKey>,
    /// References dropped because the catalog has no such field.
    pub ignored: Vec<FieldId>,
}

impl ResolvedQuery {
    /// Drops filters, group-by fields, report fields and sort keys that name a
    /// field the catalog does not have. Incomplete filters (empty field) are
    /// kept; the evaluator ignores them anyway.
    pub fn resolve(config: &ReportConfig, catalog: &FieldCatalog) -> Self {
        let mut ignored = Vec::new();
        let mut known = |field: &str| {
            let ok = catalog.contains(field);
            if !ok && !ignored.iter().any(|i: &FieldId| i == field) {
                ignored.push(field.to_string());
            }
            ok
        };

        let filters = config
            .filters
            .iter()
            .filter(|f| f.field.is_empty() || known(f.field.as_str()))
            .cloned()
            .collect();
        let group_by = config.group_by.iter().filter(|g| known(g.as_str())).cloned().collect();
        let fields = config.fields.iter().filter(|f| known(f.id.as_str())).cloned().collect();
        let sort_by = config
            .sort_by
            .iter()
            .filter(|k| k.field == SOURCE_COUNT_FIELD || known(k.field.as_str()))
            .cloned()
            .collect();

        ResolvedQuery { filters, group_by, fields, sort_by, ignored }
    }
}

/// The output of one full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub rows: Vec<AggregatedRow>,
    /// Summary over every filtered record; `None` when nothing passed the filters.
    pub totals: Option<AggregatedRow>,
    pub filtered_count: usize,
    pub source_count: usize,
    /// Configuration references that were ignored because the catalog lacks them.
    pub ignored_fields: Vec<FieldId>,
}

impl ReportResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs filter -> aggregate -> sort for a configuration.
pub fn run_report(
    records: &[RecordRef],
    config: &ReportConfig,
    catalog: &FieldCatalog,
) -> Result<ReportResult, ValidationErrors> {
    validate_for_generate(config)?;

    let query = ResolvedQuery::resolve(config, catalog);
    let filtered = apply_filters(records, &query.filters);

    let visible = visible_in_order(&query.fields);
    let table = build_table(&filtered, &query.group_by, &visible);
    let totals = table
        .grand_total()
        .map(|slot| AggregatedRow::from_slot(slot, &[], &visible));
    let rows: Vec<AggregatedRow> = table
        .into_slots()
        .into_iter()
        .map(|slot| AggregatedRow::from_slot(slot, &query.group_by, &visible))
        .collect();

    let rows = sort_rows(&rows, &query.sort_by);

    Ok(ReportResult {
        rows,
        totals,
        filtered_count: filtered.len(),
        source_count: records.len(),
        ignored_fields: query.ignored,
    })
}

/// Runs the same configuration over a current and a reference dataset and
/// joins the two on `dimension`.
pub fn run_comparison(
    current: &[RecordRef],
    previous: &[RecordRef],
    config: &ReportConfig,
    catalog: &FieldCatalog,
    dimension: &str,
    metric: &str,
) -> Result<Vec<ComparisonRow>, ValidationErrors> {
    let current_result = run_report(current, config, catalog)?;
    let previous_result = run_report(previous, config, catalog)?;
    Ok(compare(&current_result.rows, &previous_result.rows, dimension, metric))
}
