//! FILENAME: core/report-engine/src/catalog.rs
//! Field Catalog - the schema inferred from one sample record.
//!
//! The catalog is built once per dataset and drives the editor's field list,
//! the default aggregation for new fields and the validation of every field
//! reference in a configuration.

use engine::{Record, RecordRef, Value};
use serde::{Deserialize, Serialize};

use crate::definition::{FieldDescriptor, FieldId, FieldType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    /// Builds the catalog from a sample record, one descriptor per key in the
    /// sample's key order. No sample means an empty catalog.
    pub fn from_sample(sample: Option<&Record>) -> Self {
        let fields = sample
            .map(|record| {
                record
                    .iter()
                    .map(|(id, value)| FieldDescriptor {
                        id: id.to_string(),
                        label: field_label(id),
                        field_type: infer_type(value),
                    })
                    .collect()
            })
            .unwrap_or_default();
        FieldCatalog { fields }
    }

    /// Uses the first record of the dataset as the sample.
    pub fn from_records(records: &[RecordRef]) -> Self {
        Self::from_sample(records.first().map(|r| r.as_ref()))
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn field_type(&self, id: &str) -> Option<FieldType> {
        self.get(id).map(|f| f.field_type)
    }

    /// Display label for a field, falling back to the raw id.
    pub fn label_of(&self, id: &str) -> String {
        self.get(id).map(|f| f.label.clone()).unwrap_or_else(|| id.to_string())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field ids present in `previous` that this catalog no longer has.
    pub fn removed_since(&self, previous: &FieldCatalog) -> Vec<FieldId> {
        previous
            .ids()
            .filter(|id| !self.contains(id))
            .map(str::to_string)
            .collect()
    }
}

/// Maps a sample value to its primitive type tag. Null is inferred as a string,
/// which keeps every filter operator usable on the field.
pub fn infer_type(value: &Value) -> FieldType {
    match value {
        Value::Number(_) => FieldType::Number,
        Value::Bool(_) => FieldType::Boolean,
        Value::Text(_) | Value::Null => FieldType::String,
    }
}

/// Turns a record key into a label: `unitPrice` -> "Unit Price",
/// `order_date` -> "Order Date", `requestID` -> "Request ID".
pub fn field_label(id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in id.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
