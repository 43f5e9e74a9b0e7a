//! FILENAME: app/dashboard/src/report/types.rs
//! PURPOSE: Request/response types exchanged with the dashboard host.

use report_engine::{
    AggregatedRow, ComparisonRow, DisplayMode, FilterOperator, PrunedReference, ReportConfig, ViewportWindow,
};
use serde::{Deserialize, Serialize};

/// A saved report: the configuration plus the identity assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub id: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    #[serde(flatten)]
    pub config: ReportConfig,
}

impl SavedReport {
    pub fn new(config: ReportConfig) -> Self {
        SavedReport {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub dimension: String,
    pub metric: String,
}

/// Summary returned by `generate_report`; rows are fetched through the
/// viewport or page commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub row_count: usize,
    pub filtered_count: usize,
    pub source_count: usize,
    pub totals: Option<AggregatedRow>,
    pub ignored_fields: Vec<String>,
    pub display_mode: DisplayMode,
    pub window: ViewportWindow,
    /// True when the memoized result of an identical earlier call was reused.
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRow {
    pub index: usize,
    pub row: AggregatedRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsResponse {
    pub window: ViewportWindow,
    pub rows: Vec<IndexedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub page_index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<AggregatedRow>,
}

/// What happened when a dataset refresh was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub applied: bool,
    pub generation: u64,
    pub record_count: usize,
    /// Configuration references removed because their field disappeared.
    pub pruned: Vec<PrunedReference>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub dimension: String,
    pub metric: String,
    pub rows: Vec<ComparisonRow>,
}
