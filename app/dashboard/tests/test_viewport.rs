//! FILENAME: tests/test_viewport.rs
//! Integration tests for windowed rendering and pagination of report rows.

mod common;

use std::sync::Arc;

use common::TestHarness;
use dashboard_lib::report::commands::*;
use dashboard_lib::DashboardSettings;
use engine::{Record, RecordRef, Value};
use report_engine::DisplayMode;

/// `count` records with a unique `code`, so grouping by code keeps one row each.
fn unique_rows(count: usize) -> Vec<RecordRef> {
    (0..count)
        .map(|i| {
            Arc::new(Record::from_pairs([
                ("code", Value::text(format!("C{:05}", i))),
                ("amount", Value::from(i as f64)),
            ]))
        })
        .collect()
}

fn harness_with_rows(count: usize, settings: DashboardSettings) -> TestHarness {
    let harness = TestHarness::with_settings(settings);
    load_dataset(&harness.state, unique_rows(count)).unwrap();
    add_report_field(&harness.state, "amount").unwrap();
    set_group_by(&harness.state, vec!["code".into()]).unwrap();
    harness
}

#[test]
fn test_large_result_is_virtualized() {
    let harness = harness_with_rows(10_000, DashboardSettings::default());
    let response = generate_report(&harness.state).unwrap();

    assert_eq!(response.row_count, 10_000);
    assert_eq!(response.display_mode, DisplayMode::Virtualized);
    assert_eq!(response.window.total_height, 700_000.0);
    assert_eq!(response.window.first_index, 0);
}

#[test]
fn test_scroll_materializes_only_the_window() {
    let harness = harness_with_rows(10_000, DashboardSettings::default());
    generate_report(&harness.state).unwrap();

    let rows = scroll_report(&harness.state, 350_000.0).unwrap();
    assert_eq!(rows.window.first_index, 5000);
    assert_eq!(rows.rows.len(), rows.window.materialized_count());
    assert_eq!(rows.rows[0].index, 4995);

    let rows = scroll_report(&harness.state, 1.0e9).unwrap();
    assert_eq!(rows.window.first_index, 9991);
    assert_eq!(rows.window.overscan_last, 9999);
    let last = rows.rows.last().unwrap();
    assert_eq!(last.index, 9999);
    assert_eq!(last.row.label(), "C09999");
}

#[test]
fn test_resize_changes_visible_count() {
    let harness = harness_with_rows(1_000, DashboardSettings::default());
    generate_report(&harness.state).unwrap();
    let window = resize_report_viewport(&harness.state, 1_400.0).unwrap();
    assert_eq!(window.visible_count, 20);
}

#[test]
fn test_unbounded_resize_keeps_session_usable() {
    let harness = harness_with_rows(1_000, DashboardSettings::default());
    generate_report(&harness.state).unwrap();

    let window = resize_report_viewport(&harness.state, f64::INFINITY).unwrap();
    assert_eq!(window.first_index, 0);
    assert_eq!(window.overscan_last, 999);

    let window = resize_report_viewport(&harness.state, 600.0).unwrap();
    assert_eq!(window.visible_count, 9);
    let rows = scroll_report(&harness.state, 7_000.0).unwrap();
    assert_eq!(rows.window.first_index, 100);
}

#[test]
fn test_small_result_is_paged() {
    let settings = DashboardSettings { page_size: 10, ..DashboardSettings::default() };
    let harness = harness_with_rows(45, settings);
    let response = generate_report(&harness.state).unwrap();
    assert_eq!(response.display_mode, DisplayMode::Paged);

    let page = get_report_page(&harness.state, 4).unwrap();
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.rows.len(), 5);

    let clamped = get_report_page(&harness.state, 40).unwrap();
    assert_eq!(clamped.page_index, 4);
}

#[test]
fn test_virtualization_can_be_disabled() {
    let settings = DashboardSettings { virtualization: false, ..DashboardSettings::default() };
    let harness = harness_with_rows(1_000, settings);
    assert_eq!(generate_report(&harness.state).unwrap().display_mode, DisplayMode::Paged);
}

#[test]
fn test_rows_before_generate_is_an_error() {
    let harness = TestHarness::new();
    assert!(scroll_report(&harness.state, 0.0).is_err());
    assert!(get_report_page(&harness.state, 0).is_err());
}
