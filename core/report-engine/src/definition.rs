//! FILENAME: core/report-engine/src/definition.rs
//! Report Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a report.
//! These structures are designed to be:
//! - Serializable (saved reports are handed to an external store)
//! - Edited by the configuration model in `editor`
//! - Immutable snapshots of user intent once a pipeline run starts

use serde::{Deserialize, Serialize};

/// Identifier of a field (the record key it reads).
pub type FieldId = String;

/// Pseudo-field addressing `AggregatedRow::source_count` in sort keys and comparisons.
pub const SOURCE_COUNT_FIELD: &str = "sourceCount";

// ============================================================================
// FIELD TYPES
// ============================================================================

/// Primitive type inferred for a field from a sample record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::String
    }
}

/// A field available to the report editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Record key.
    pub id: FieldId,

    /// Human readable label (e.g. "Unit Price" for `unitPrice`).
    pub label: String,

    /// Inferred primitive type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for report fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Count,
    Sum,
    #[serde(rename = "avg")]
    Average,
    Min,
    Max,
}

impl AggregationType {
    /// Default aggregation for a newly added field of the given type.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Number => AggregationType::Sum,
            FieldType::String | FieldType::Boolean => AggregationType::Count,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AggregationType::Count => "Count",
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Average",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
        }
    }
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Count
    }
}

/// A field placed in the report with its aggregation function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportField {
    /// The record key this field reads.
    pub id: FieldId,

    /// The aggregation function to apply per group.
    pub aggregation: AggregationType,

    /// Hidden fields stay in the configuration but are not aggregated.
    pub visible: bool,

    /// Presentation position. Unique and contiguous (0..len) after every edit.
    pub order: usize,
}

impl ReportField {
    pub fn new(id: impl Into<FieldId>, aggregation: AggregationType, order: usize) -> Self {
        ReportField {
            id: id.into(),
            aggregation,
            visible: true,
            order,
        }
    }
}

// ============================================================================
// FILTER DEFINITIONS
// ============================================================================

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equals,
    Contains,
    Greater,
    Less,
}

impl FilterOperator {
    /// Whether the operator is meaningful for a field type. Incompatible
    /// combinations still evaluate through coercion.
    pub fn is_compatible(self, field_type: FieldType) -> bool {
        match self {
            FilterOperator::Equals => true,
            FilterOperator::Contains => field_type == FieldType::String,
            FilterOperator::Greater | FilterOperator::Less => field_type == FieldType::Number,
        }
    }
}

impl Default for FilterOperator {
    fn default() -> Self {
        FilterOperator::Equals
    }
}

/// A single (field, operator, value) predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub field: FieldId,
    pub operator: FilterOperator,
    /// Literal compared against the record value, always entered as text.
    pub value: String,
}

impl Filter {
    pub fn new(
        id: impl Into<String>,
        field: impl Into<FieldId>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Filter {
            id: id.into(),
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// A filter missing its field or value is still being configured and
    /// never hides data.
    pub fn is_active(&self) -> bool {
        !self.field.is_empty() && !self.value.is_empty()
    }
}

// ============================================================================
// SORTING & LAYOUT
// ============================================================================

/// Sort direction for a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: FieldId,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<FieldId>) -> Self {
        SortKey { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<FieldId>) -> Self {
        SortKey { field: field.into(), direction: SortDirection::Desc }
    }
}

/// How the generated report is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLayout {
    Table,
    Bar,
    Pie,
    Line,
}

impl Default for ReportLayout {
    fn default() -> Self {
        ReportLayout::Table
    }
}

// ============================================================================
// REPORT CONFIG
// ============================================================================

/// The complete, user-editable report configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Fields placed in the report. Required before generate or save.
    #[serde(default)]
    pub fields: Vec<ReportField>,

    /// AND-combined filters.
    #[serde(default)]
    pub filters: Vec<Filter>,

    /// Dimensions, outermost first.
    #[serde(default)]
    pub group_by: Vec<FieldId>,

    /// Sort keys, most significant first.
    #[serde(default)]
    pub sort_by: Vec<SortKey>,

    #[serde(default)]
    pub layout: ReportLayout,
}

impl ReportConfig {
    pub fn new(name: impl Into<String>) -> Self {
        ReportConfig {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, id: &str) -> Option<&ReportField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Visible fields in presentation order.
    pub fn visible_fields(&self) -> Vec<&ReportField> {
        let mut visible: Vec<&ReportField> = self.fields.iter().filter(|f| f.visible).collect();
        visible.sort_by_key(|f| f.order);
        visible
    }
}
