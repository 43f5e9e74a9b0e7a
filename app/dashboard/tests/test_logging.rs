//! FILENAME: tests/test_logging.rs
//! Integration test for the unified log file.

mod common;

use std::sync::Arc;

use common::OrdersFixture;
use dashboard_lib::report::commands::*;
use dashboard_lib::{create_dashboard_state, logging, DashboardSettings};

#[test]
fn test_log_lines_use_unified_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("dashboard.log");
    let settings = DashboardSettings { log_file: Some(path.clone()), ..DashboardSettings::default() };

    let state = Arc::new(create_dashboard_state(settings));
    assert_eq!(logging::log_path(), Some(path.clone()));

    load_dataset(&state, OrdersFixture::records()).unwrap();
    add_report_field(&state, "quantity").unwrap();
    generate_report(&state).unwrap();
    let saved = save_report(&state).unwrap();
    set_report_name(&state, " ").unwrap();
    assert!(save_report(&state).is_err());
    dashboard_lib::log_warn!("TEST", "custom {}", 42);

    // A panic while holding the session poisons it; commands report and log it
    let holder = Arc::clone(&state);
    let _ = std::thread::spawn(move || {
        let _guard = holder.session.lock().unwrap();
        panic!("session holder panicked");
    })
    .join();
    assert!(generate_report(&state).is_err());

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines.iter().any(|l| l.contains("|I|SYS|Creating DashboardState")));
    assert!(lines.iter().any(|l| l.contains("|I|SESSION|dataset generation=1 records=8")));
    assert!(lines.iter().any(|l| l.contains("|I|REPORT|ENTER generate_report")));
    assert!(lines.iter().any(|l| l.ends_with("|W|TEST|custom 42")));
    assert!(lines.iter().any(|l| l.ends_with("|D|STORE|ENTER save_report")));
    assert!(lines.iter().any(|l| l.ends_with(&format!("|D|STORE|EXIT save_report id={}", saved.id))));
    assert!(lines.iter().any(|l| l.contains("|W|STORE|save_report rejected: ")));
    assert!(lines.iter().any(|l| l.contains("|E|SESSION|session lock poisoned")));

    let seqs: Vec<u64> = lines
        .iter()
        .map(|l| l.split('|').next().unwrap().parse().unwrap())
        .collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}
