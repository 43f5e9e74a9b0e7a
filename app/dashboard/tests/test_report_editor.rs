//! FILENAME: tests/test_report_editor.rs
//! Integration tests for configuration editing, validation and saving.

mod common;

use common::{OrdersFixture, TestHarness};
use dashboard_lib::report::commands::*;
use dashboard_lib::FilterRequest;
use engine::{Record, RecordRef, Value};
use report_engine::{AggregationType, ConfigLocation, FilterOperator, ReportLayout, SortKey};
use std::sync::Arc;

fn field_ids(harness: &TestHarness) -> Vec<(String, usize)> {
    get_report_config(&harness.state)
        .unwrap()
        .fields
        .into_iter()
        .map(|f| (f.id, f.order))
        .collect()
}

// ============================================================================
// FIELD EDITS
// ============================================================================

#[test]
fn test_field_catalog_follows_sample_record() {
    let harness = TestHarness::with_orders();
    let catalog = get_field_catalog(&harness.state).unwrap();
    let ids: Vec<&str> = catalog.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, OrdersFixture::headers());
    assert_eq!(catalog[4].label, "Unit Price");
}

#[test]
fn test_add_move_remove_fields() {
    let harness = TestHarness::with_orders();
    for id in ["item", "quantity", "unitPrice"] {
        add_report_field(&harness.state, id).unwrap();
    }
    let config = get_report_config(&harness.state).unwrap();
    assert_eq!(config.fields[0].aggregation, AggregationType::Count);
    assert_eq!(config.fields[1].aggregation, AggregationType::Sum);

    move_report_field(&harness.state, 0, 2).unwrap();
    assert_eq!(
        field_ids(&harness),
        vec![("quantity".into(), 0), ("unitPrice".into(), 1), ("item".into(), 2)]
    );

    remove_report_field(&harness.state, "unitPrice").unwrap();
    assert_eq!(field_ids(&harness), vec![("quantity".into(), 0), ("item".into(), 1)]);

    assert!(add_report_field(&harness.state, "quantity").is_err());
    assert!(add_report_field(&harness.state, "vendor").is_err());
    assert!(move_report_field(&harness.state, 0, 9).is_err());
}

#[test]
fn test_filter_lifecycle() {
    let harness = TestHarness::with_orders();
    let id = add_report_filter(
        &harness.state,
        FilterRequest { field: "department".into(), operator: FilterOperator::Equals, value: "Ops".into() },
    )
    .unwrap();

    update_report_filter(
        &harness.state,
        &id,
        FilterRequest { field: "department".into(), operator: FilterOperator::Contains, value: "fin".into() },
    )
    .unwrap();
    let config = get_report_config(&harness.state).unwrap();
    assert_eq!(config.filters[0].operator, FilterOperator::Contains);

    remove_report_filter(&harness.state, &id).unwrap();
    assert!(remove_report_filter(&harness.state, &id).is_err());
}

// ============================================================================
// SAVE
// ============================================================================

#[test]
fn test_save_lists_every_missing_requirement() {
    let harness = TestHarness::with_orders();
    set_report_name(&harness.state, "").unwrap();

    let err = save_report(&harness.state).unwrap_err();
    assert!(err.contains("name"), "{}", err);
    assert!(err.contains("fields"), "{}", err);

    let issues = validate_report(&harness.state).unwrap();
    let locations: Vec<ConfigLocation> = issues.into_iter().map(|i| i.location).collect();
    assert_eq!(locations, vec![ConfigLocation::Name, ConfigLocation::Fields]);
    assert!(list_saved_reports(&harness.state).unwrap().is_empty());
}

#[test]
fn test_save_and_reopen() {
    let harness = TestHarness::with_orders();
    set_report_name(&harness.state, "Supplies by department").unwrap();
    set_report_description(&harness.state, "Monthly").unwrap();
    add_report_field(&harness.state, "quantity").unwrap();
    set_group_by(&harness.state, vec!["department".into()]).unwrap();
    set_sort_by(&harness.state, vec![SortKey::asc("department")]).unwrap();
    set_report_layout(&harness.state, ReportLayout::Pie).unwrap();

    let saved = save_report(&harness.state).unwrap();
    assert_eq!(saved.id.len(), 36);
    assert!(chrono::DateTime::parse_from_rfc3339(&saved.created_at).is_ok());

    set_report_name(&harness.state, "Scratch").unwrap();
    remove_report_field(&harness.state, "quantity").unwrap();

    let reopened = open_saved_report(&harness.state, &saved.id).unwrap();
    assert_eq!(reopened, saved.config);
    assert_eq!(reopened.layout, ReportLayout::Pie);
    assert!(open_saved_report(&harness.state, "missing").is_err());

    assert!(delete_saved_report(&harness.state, &saved.id).unwrap());
}

// ============================================================================
// SCHEMA RECONCILIATION
// ============================================================================

#[test]
fn test_refresh_prunes_removed_fields() {
    let harness = TestHarness::with_orders();
    add_report_field(&harness.state, "quantity").unwrap();
    add_report_field(&harness.state, "unitPrice").unwrap();
    set_group_by(&harness.state, vec!["department".into(), "item".into()]).unwrap();
    add_report_filter(
        &harness.state,
        FilterRequest { field: "unitPrice".into(), operator: FilterOperator::Less, value: "10".into() },
    )
    .unwrap();

    let narrower: Vec<RecordRef> = vec![Arc::new(Record::from_pairs([
        ("department", Value::text("Ops")),
        ("quantity", Value::from(3.0)),
    ]))];
    let outcome = load_dataset(&harness.state, narrower).unwrap();

    let pruned: Vec<&str> = outcome.pruned.iter().map(|p| p.field.as_str()).collect();
    assert_eq!(pruned, vec!["unitPrice", "unitPrice", "item"]);

    let config = get_report_config(&harness.state).unwrap();
    assert_eq!(config.fields.len(), 1);
    assert_eq!(config.fields[0].order, 0);
    assert!(config.filters.is_empty());
    assert_eq!(config.group_by, vec!["department"]);
    assert!(generate_report(&harness.state).is_ok());
}
