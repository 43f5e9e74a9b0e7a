//! FILENAME: core/report-engine/src/lib.rs
//! Ad-hoc reporting subsystem for the dashboard.
//!
//! This crate turns a flat dataset of records into grouped, aggregated,
//! sorted report rows. It depends on `engine` only for the shared record
//! model (Value, Record).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the report IS)
//! - `catalog`: Field schema inferred from the data
//! - `editor` / `validation`: Editing and checking a configuration
//! - `filter`, `cache`, `sort`, `compare`: Pipeline stages (HOW we compute)
//! - `engine`: The pipeline itself
//! - `view`, `export`: Windowed rendering and export shapes (WHAT we display)

pub mod definition;
pub mod catalog;
pub mod filter;
pub mod cache;
pub mod sort;
pub mod compare;
pub mod engine;
pub mod validation;
pub mod editor;
pub mod error;
pub mod view;
pub mod export;

pub use definition::*;
pub use catalog::{field_label, infer_type, FieldCatalog};
pub use filter::{apply_filters, record_matches};
pub use sort::{sort_records, sort_rows, Sortable};
pub use compare::{change_percent, compare, ComparisonRow};
pub use crate::engine::{aggregate, run_comparison, run_report, AggregatedRow, GroupValue, MetricValue, ReportResult};
pub use validation::{
    prune_removed_fields, validate, validate_for_generate, validate_for_save, ConfigLocation, PrunedReference,
    ValidationErrors, ValidationIssue,
};
pub use editor::ReportEditor;
pub use error::EditError;
pub use view::*;
pub use export::{chart_data, export_comparison, export_report, ChartData, ChartSeries, ColumnDescriptor, ColumnKind, ExportTable};
