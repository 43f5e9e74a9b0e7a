//! FILENAME: core/report-engine/src/export.rs
//! Export shapes handed to external exporters and chart surfaces.
//!
//! The engine never formats files. An exporter receives one `ExportTable`
//! (column descriptors + rows of primitive values) and turns it into a
//! spreadsheet or PDF on its own.

use engine::Value;
use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;
use crate::compare::ComparisonRow;
use crate::definition::{ReportConfig, ReportLayout};
use crate::engine::{AggregatedRow, ReportResult};

// ============================================================================
// TABLE EXPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    Dimension,
    Metric,
    RecordCount,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: String,
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    fn new(id: impl Into<String>, label: impl Into<String>, kind: ColumnKind) -> Self {
        ColumnDescriptor { id: id.into(), label: label.into(), kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<Value>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column layout of an aggregated result: one column per group-by field,
/// one per metric ("Sum of Quantity"), then the record count.
fn aggregated_columns(sample: &AggregatedRow, catalog: &FieldCatalog) -> Vec<ColumnDescriptor> {
    let mut columns: Vec<ColumnDescriptor> = sample
        .group_key
        .iter()
        .map(|g| ColumnDescriptor::new(g.field.clone(), catalog.label_of(&g.field), ColumnKind::Dimension))
        .collect();
    columns.extend(sample.metrics.iter().map(|m| {
        ColumnDescriptor::new(
            m.field.clone(),
            format!("{} of {}", m.aggregation.label(), catalog.label_of(&m.field)),
            ColumnKind::Metric,
        )
    }));
    columns.push(ColumnDescriptor::new(
        crate::definition::SOURCE_COUNT_FIELD,
        "Records",
        ColumnKind::RecordCount,
    ));
    columns
}

fn aggregated_cells(row: &AggregatedRow) -> Vec<Value> {
    row.group_key
        .iter()
        .map(|g| g.value.clone())
        .chain(row.metrics.iter().map(|m| Value::Number(m.value)))
        .chain(std::iter::once(Value::Number(row.source_count as f64)))
        .collect()
}

/// Builds the export table for a generated report. The grand total, when
/// present, is appended as a final row labelled "Total". Ungrouped reports
/// already are their own total and get no extra row.
pub fn export_report(result: &ReportResult, config: &ReportConfig, catalog: &FieldCatalog) -> ExportTable {
    let columns = match result.rows.first() {
        Some(first) => aggregated_columns(first, catalog),
        None => {
            // No rows: still describe the columns the configuration asks for
            let mut columns: Vec<ColumnDescriptor> = config
                .group_by
                .iter()
                .map(|g| ColumnDescriptor::new(g.clone(), catalog.label_of(g), ColumnKind::Dimension))
                .collect();
            columns.extend(config.visible_fields().into_iter().map(|f| {
                ColumnDescriptor::new(
                    f.id.clone(),
                    format!("{} of {}", f.aggregation.label(), catalog.label_of(&f.id)),
                    ColumnKind::Metric,
                )
            }));
            columns.push(ColumnDescriptor::new(
                crate::definition::SOURCE_COUNT_FIELD,
                "Records",
                ColumnKind::RecordCount,
            ));
            columns
        }
    };

    let mut rows: Vec<Vec<Value>> = result.rows.iter().map(aggregated_cells).collect();

    let dims = result.rows.first().map_or(0, |first| first.group_key.len());
    if let Some(totals) = result.totals.as_ref().filter(|_| dims > 0) {
        let mut cells: Vec<Value> = (0..dims)
            .map(|i| if i == 0 { Value::text("Total") } else { Value::Null })
            .collect();
        cells.extend(totals.metrics.iter().map(|m| Value::Number(m.value)));
        cells.push(Value::Number(totals.source_count as f64));
        rows.push(cells);
    }

    ExportTable { columns, rows }
}

/// Builds the export table for a period comparison.
pub fn export_comparison(rows: &[ComparisonRow], dimension_label: &str, metric_label: &str) -> ExportTable {
    let columns = vec![
        ColumnDescriptor::new("dimensionKey", dimension_label, ColumnKind::Dimension),
        ColumnDescriptor::new("current", format!("{} (current)", metric_label), ColumnKind::Metric),
        ColumnDescriptor::new("previous", format!("{} (previous)", metric_label), ColumnKind::Metric),
        ColumnDescriptor::new("changePercent", "Change %", ColumnKind::Percent),
    ];
    let rows = rows
        .iter()
        .map(|r| {
            vec![
                Value::text(r.dimension_key.clone()),
                Value::Number(r.current),
                Value::Number(r.previous),
                Value::Number(r.change_percent),
            ]
        })
        .collect();
    ExportTable { columns, rows }
}

// ============================================================================
// CHART DATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub field: String,
    pub label: String,
    pub values: Vec<f64>,
}

/// Chart-ready data for the bar/pie/line layouts: one label per row and one
/// series per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub layout: ReportLayout,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

pub fn chart_data(rows: &[AggregatedRow], layout: ReportLayout, catalog: &FieldCatalog) -> ChartData {
    let labels = rows
        .iter()
        .map(|r| {
            let label = r.label();
            if label.is_empty() {
                "All".to_string()
            } else {
                label
            }
        })
        .collect();

    let series = match rows.first() {
        Some(first) => first
            .metrics
            .iter()
            .enumerate()
            .map(|(idx, m)| ChartSeries {
                field: m.field.clone(),
                label: format!("{} of {}", m.aggregation.label(), catalog.label_of(&m.field)),
                values: rows
                    .iter()
                    .map(|r| r.metrics.get(idx).map(|v| v.value).unwrap_or(0.0))
                    .collect(),
            })
            .collect(),
        None => Vec::new(),
    };

    ChartData { layout, labels, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{AggregationType, ReportField};
    use crate::engine::run_report;
    use engine::{Record, RecordRef};
    use std::sync::Arc;

    fn orders() -> Vec<RecordRef> {
        [("Finance", 3.0), ("Ops", 5.0), ("Finance", 2.0)]
            .iter()
            .map(|(dept, qty)| {
                Arc::new(Record::from_pairs([
                    ("department", Value::text(*dept)),
                    ("quantity", Value::from(*qty)),
                ]))
            })
            .collect()
    }

    fn config() -> ReportConfig {
        let mut config = ReportConfig::new("Export");
        config.fields = vec![ReportField::new("quantity", AggregationType::Sum, 0)];
        config.group_by = vec!["department".to_string()];
        config
    }

    #[test]
    fn test_export_report_columns_and_total() {
        let records = orders();
        let catalog = FieldCatalog::from_records(&records);
        let config = config();
        let result = run_report(&records, &config, &catalog).unwrap();
        let table = export_report(&result, &config, &catalog);

        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Department", "Sum of Quantity", "Records"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec![Value::text("Finance"), Value::Number(5.0), Value::Number(2.0)]);
        assert_eq!(table.rows[2], vec![Value::text("Total"), Value::Number(10.0), Value::Number(3.0)]);
    }

    #[test]
    fn test_export_ungrouped_report_has_no_total_row() {
        let records = orders();
        let catalog = FieldCatalog::from_records(&records);
        let mut config = config();
        config.group_by.clear();
        let result = run_report(&records, &config, &catalog).unwrap();
        let table = export_report(&result, &config, &catalog);

        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Sum of Quantity", "Records"]);
        assert_eq!(table.rows, vec![vec![Value::Number(10.0), Value::Number(3.0)]]);
    }

    #[test]
    fn test_export_empty_result_keeps_columns() {
        let catalog = FieldCatalog::from_records(&orders());
        let config = config();
        let result = run_report(&[], &config, &catalog).unwrap();
        let table = export_report(&result, &config, &catalog);
        assert_eq!(table.columns.len(), 3);
        assert!(table.is_empty());
    }

    #[test]
    fn test_export_comparison() {
        let rows = vec![ComparisonRow::new("Finance", 120.0, 100.0)];
        let table = export_comparison(&rows, "Department", "Quantity");
        assert_eq!(table.columns[1].label, "Quantity (current)");
        assert_eq!(table.rows[0][3], Value::Number(20.0));
    }

    #[test]
    fn test_chart_data() {
        let records = orders();
        let catalog = FieldCatalog::from_records(&records);
        let result = run_report(&records, &config(), &catalog).unwrap();
        let chart = chart_data(&result.rows, ReportLayout::Bar, &catalog);
        assert_eq!(chart.labels, vec!["Finance", "Ops"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].values, vec![5.0, 5.0]);
    }
}
