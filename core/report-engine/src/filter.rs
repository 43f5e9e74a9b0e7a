//! FILENAME: core/report-engine/src/filter.rs
//! Filter Evaluator - AND-combined (field, operator, value) predicates.
//!
//! Filters are compiled once per call (lower-cased needle, parsed threshold)
//! so the record scan is a single linear pass.

use engine::{parse_number, Record, RecordRef};

use crate::definition::{Filter, FilterOperator};

/// A filter with its literal pre-coerced for the operator.
#[derive(Debug)]
enum CompiledFilter<'a> {
    Equals { field: &'a str, value: &'a str },
    Contains { field: &'a str, needle: String },
    /// `None` threshold: the literal is not a number, nothing passes.
    Greater { field: &'a str, threshold: Option<f64> },
    Less { field: &'a str, threshold: Option<f64> },
}

impl<'a> CompiledFilter<'a> {
    fn compile(filter: &'a Filter) -> Self {
        let field = filter.field.as_str();
        match filter.operator {
            FilterOperator::Equals => CompiledFilter::Equals { field, value: &filter.value },
            FilterOperator::Contains => CompiledFilter::Contains {
                field,
                needle: filter.value.to_lowercase(),
            },
            FilterOperator::Greater => CompiledFilter::Greater {
                field,
                threshold: parse_number(&filter.value),
            },
            FilterOperator::Less => CompiledFilter::Less {
                field,
                threshold: parse_number(&filter.value),
            },
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            CompiledFilter::Equals { field, value } => {
                record.value(field).to_display_string() == *value
            }
            CompiledFilter::Contains { field, needle } => record
                .value(field)
                .to_display_string()
                .to_lowercase()
                .contains(needle.as_str()),
            CompiledFilter::Greater { field, threshold } => {
                match (record.value(field).as_number(), threshold) {
                    (Some(n), Some(t)) => n > *t,
                    _ => false,
                }
            }
            CompiledFilter::Less { field, threshold } => {
                match (record.value(field).as_number(), threshold) {
                    (Some(n), Some(t)) => n < *t,
                    _ => false,
                }
            }
        }
    }
}

/// Returns the records that pass every active filter, in input order.
/// An empty (or entirely inactive) filter list returns the input unchanged.
pub fn apply_filters(records: &[RecordRef], filters: &[Filter]) -> Vec<RecordRef> {
    let compiled: Vec<CompiledFilter> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(CompiledFilter::compile)
        .collect();

    if compiled.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| compiled.iter().all(|f| f.matches(record)))
        .cloned()
        .collect()
}

/// Whether a single record passes all active filters.
pub fn record_matches(record: &Record, filters: &[Filter]) -> bool {
    filters
        .iter()
        .filter(|f| f.is_active())
        .all(|f| CompiledFilter::compile(f).matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Value;
    use std::sync::Arc;

    fn quantities(values: &[f64]) -> Vec<RecordRef> {
        values
            .iter()
            .map(|q| Arc::new(Record::from_pairs([("quantity", Value::from(*q))])))
            .collect()
    }

    fn items() -> Vec<RecordRef> {
        ["Blue Pen", "Stapler", "pencil case", "Paper"]
            .iter()
            .map(|name| Arc::new(Record::from_pairs([("item", *name)])))
            .collect()
    }

    fn numbers(records: &[RecordRef]) -> Vec<f64> {
        records.iter().filter_map(|r| r.value("quantity").as_number()).collect()
    }

    #[test]
    fn test_greater_is_strict() {
        let records = quantities(&[5.0, 10.0, 15.0, 20.0, 25.0]);
        let filters = vec![Filter::new("f1", "quantity", FilterOperator::Greater, "10")];
        assert_eq!(numbers(&apply_filters(&records, &filters)), vec![15.0, 20.0, 25.0]);
    }

    #[test]
    fn test_less_is_strict() {
        let records = quantities(&[5.0, 10.0, 15.0]);
        let filters = vec![Filter::new("f1", "quantity", FilterOperator::Less, "10")];
        assert_eq!(numbers(&apply_filters(&records, &filters)), vec![5.0]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let filters = vec![Filter::new("f1", "item", FilterOperator::Contains, "PEN")];
        let result = apply_filters(&items(), &filters);
        let names: Vec<String> = result.iter().map(|r| r.value("item").to_display_string()).collect();
        assert_eq!(names, vec!["Blue Pen", "pencil case"]);
    }

    #[test]
    fn test_equals_uses_string_coercion() {
        let records = quantities(&[1.5, 2.0]);
        let filters = vec![Filter::new("f1", "quantity", FilterOperator::Equals, "2")];
        assert_eq!(numbers(&apply_filters(&records, &filters)), vec![2.0]);
    }

    #[test]
    fn test_non_numeric_values_fail_numeric_predicates() {
        let records: Vec<RecordRef> = vec![
            Arc::new(Record::from_pairs([("quantity", Value::text("n/a"))])),
            Arc::new(Record::from_pairs([("quantity", Value::Null)])),
            Arc::new(Record::from_pairs([("quantity", Value::text("12"))])),
        ];
        let filters = vec![Filter::new("f1", "quantity", FilterOperator::Greater, "10")];
        assert_eq!(apply_filters(&records, &filters).len(), 1);

        let bad_literal = vec![Filter::new("f1", "quantity", FilterOperator::Less, "lots")];
        assert!(apply_filters(&records, &bad_literal).is_empty());
    }

    #[test]
    fn test_incomplete_filters_are_ignored() {
        let records = quantities(&[1.0, 2.0]);
        let filters = vec![
            Filter::new("f1", "", FilterOperator::Equals, "1"),
            Filter::new("f2", "quantity", FilterOperator::Equals, ""),
        ];
        assert_eq!(apply_filters(&records, &filters).len(), 2);
    }

    #[test]
    fn test_empty_filter_list_is_identity() {
        let records = items();
        let result = apply_filters(&records, &[]);
        assert_eq!(result.len(), records.len());
        for (a, b) in records.iter().zip(result.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_filters_are_idempotent() {
        let records = quantities(&[3.0, 8.0, 13.0, 21.0]);
        let filters = vec![
            Filter::new("f1", "quantity", FilterOperator::Greater, "4"),
            Filter::new("f2", "quantity", FilterOperator::Less, "20"),
        ];
        let once = apply_filters(&records, &filters);
        let twice = apply_filters(&once, &filters);
        assert_eq!(numbers(&once), vec![8.0, 13.0]);
        assert_eq!(numbers(&once), numbers(&twice));
    }

    #[test]
    fn test_record_matches() {
        let record = Record::from_pairs([("item", "Stapler")]);
        assert!(record_matches(&record, &[Filter::new("f1", "item", FilterOperator::Contains, "stap")]));
        assert!(!record_matches(&record, &[Filter::new("f1", "item", FilterOperator::Equals, "stapler")]));
    }
}
