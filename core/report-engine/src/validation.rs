//! FILENAME: core/report-engine/src/validation.rs
//! Configuration checks and schema reconciliation.
//!
//! Generation only needs at least one field; stale references are dropped
//! by the pipeline. Saving is stricter: a saved report must be complete and
//! must only reference fields the current catalog knows.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::FieldCatalog;
use crate::definition::{FieldId, ReportConfig, SOURCE_COUNT_FIELD};

/// Where in a configuration an issue was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "camelCase")]
pub enum ConfigLocation {
    Name,
    Fields,
    Field(FieldId),
    Filter(String),
    GroupBy(usize),
    SortBy(usize),
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLocation::Name => write!(f, "name"),
            ConfigLocation::Fields => write!(f, "fields"),
            ConfigLocation::Field(id) => write!(f, "fields[{}]", id),
            ConfigLocation::Filter(id) => write!(f, "filters[{}].field", id),
            ConfigLocation::GroupBy(i) => write!(f, "groupBy[{}]", i),
            ConfigLocation::SortBy(i) => write!(f, "sortBy[{}]", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub location: ConfigLocation,
    pub message: String,
}

impl ValidationIssue {
    fn new(location: ConfigLocation, message: impl Into<String>) -> Self {
        ValidationIssue { location, message: message.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every issue found in one check, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid report configuration: {}", summary(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn summary(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn has(&self, location: &ConfigLocation) -> bool {
        self.issues.iter().any(|i| &i.location == location)
    }

    fn into_result(issues: Vec<ValidationIssue>) -> Result<(), ValidationErrors> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { issues })
        }
    }
}

fn fields_issue(config: &ReportConfig) -> Option<ValidationIssue> {
    if config.fields.is_empty() {
        Some(ValidationIssue::new(ConfigLocation::Fields, "add at least one field"))
    } else {
        None
    }
}

/// Requirements for running the pipeline.
pub fn validate_for_generate(config: &ReportConfig) -> Result<(), ValidationErrors> {
    ValidationErrors::into_result(fields_issue(config).into_iter().collect())
}

/// Requirements for saving: a name, at least one field, and no reference to
/// a field outside the catalog. All problems are reported together.
pub fn validate_for_save(config: &ReportConfig, catalog: &FieldCatalog) -> Result<(), ValidationErrors> {
    ValidationErrors::into_result(validate(config, catalog))
}

/// Every issue in a configuration, for editor feedback.
pub fn validate(config: &ReportConfig, catalog: &FieldCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if config.name.trim().is_empty() {
        issues.push(ValidationIssue::new(ConfigLocation::Name, "report name is required"));
    }
    issues.extend(fields_issue(config));
    issues.extend(reference_issues(config, catalog));
    issues
}

/// References to fields the catalog does not contain.
pub fn reference_issues(config: &ReportConfig, catalog: &FieldCatalog) -> Vec<ValidationIssue> {
    let unknown = |id: &str| format!("unknown field '{}'", id);
    let mut issues = Vec::new();

    for field in &config.fields {
        if !catalog.contains(&field.id) {
            issues.push(ValidationIssue::new(ConfigLocation::Field(field.id.clone()), unknown(&field.id)));
        }
    }
    for filter in &config.filters {
        if !filter.field.is_empty() && !catalog.contains(&filter.field) {
            issues.push(ValidationIssue::new(ConfigLocation::Filter(filter.id.clone()), unknown(&filter.field)));
        }
    }
    for (i, group) in config.group_by.iter().enumerate() {
        if !catalog.contains(group) {
            issues.push(ValidationIssue::new(ConfigLocation::GroupBy(i), unknown(group)));
        }
    }
    for (i, key) in config.sort_by.iter().enumerate() {
        if key.field != SOURCE_COUNT_FIELD && !catalog.contains(&key.field) {
            issues.push(ValidationIssue::new(ConfigLocation::SortBy(i), unknown(&key.field)));
        }
    }
    issues
}

// ============================================================================
// SCHEMA RECONCILIATION
// ============================================================================

/// A reference removed from a configuration after a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunedReference {
    pub location: ConfigLocation,
    pub field: FieldId,
}

/// Removes every reference to a field the catalog no longer has. Report
/// field orders are reindexed to stay contiguous. Filters with no field yet
/// are left alone.
pub fn prune_removed_fields(config: &mut ReportConfig, catalog: &FieldCatalog) -> Vec<PrunedReference> {
    let mut pruned = Vec::new();

    config.fields.retain(|f| {
        let keep = catalog.contains(&f.id);
        if !keep {
            pruned.push(PrunedReference { location: ConfigLocation::Field(f.id.clone()), field: f.id.clone() });
        }
        keep
    });
    config.fields.sort_by_key(|f| f.order);
    for (idx, field) in config.fields.iter_mut().enumerate() {
        field.order = idx;
    }

    config.filters.retain(|f| {
        let keep = f.field.is_empty() || catalog.contains(&f.field);
        if !keep {
            pruned.push(PrunedReference { location: ConfigLocation::Filter(f.id.clone()), field: f.field.clone() });
        }
        keep
    });

    let mut index = 0;
    config.group_by.retain(|g| {
        let keep = catalog.contains(g);
        if !keep {
            pruned.push(PrunedReference { location: ConfigLocation::GroupBy(index), field: g.clone() });
        }
        index += 1;
        keep
    });

    let mut index = 0;
    config.sort_by.retain(|k| {
        let keep = k.field == SOURCE_COUNT_FIELD || catalog.contains(&k.field);
        if !keep {
            pruned.push(PrunedReference { location: ConfigLocation::SortBy(index), field: k.field.clone() });
        }
        index += 1;
        keep
    });

    pruned
}
