//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for dashboard integration tests.

#![allow(dead_code)]

use std::sync::{Arc, MutexGuard};

use dashboard_lib::{create_dashboard_state, DashboardSettings, DashboardState, ReportSession};
use engine::{Record, RecordRef, Value};

/// Test harness owning one dashboard state.
pub struct TestHarness {
    pub state: DashboardState,
}

impl TestHarness {
    /// Create a harness with default settings and no data.
    pub fn new() -> Self {
        Self::with_settings(DashboardSettings::default())
    }

    pub fn with_settings(settings: DashboardSettings) -> Self {
        TestHarness { state: create_dashboard_state(settings) }
    }

    /// Create a harness loaded with the orders fixture.
    pub fn with_orders() -> Self {
        let harness = Self::new();
        harness.session().load_dataset(OrdersFixture::records());
        harness
    }

    pub fn session(&self) -> MutexGuard<'_, ReportSession> {
        self.state.session.lock().unwrap()
    }
}

/// Office-supply orders used across the integration tests.
pub struct OrdersFixture;

impl OrdersFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["orderId", "department", "item", "quantity", "unitPrice", "urgent"]
    }

    /// (department, item, quantity, unitPrice, urgent)
    pub fn data() -> Vec<(&'static str, &'static str, f64, f64, bool)> {
        vec![
            ("Finance", "Paper", 10.0, 4.5, false),
            ("Finance", "Pens", 25.0, 1.2, false),
            ("Ops", "Toner", 2.0, 65.0, true),
            ("Ops", "Paper", 40.0, 4.5, false),
            ("Legal", "Folders", 15.0, 2.0, false),
            ("Legal", "Paper", 5.0, 4.5, true),
            ("Finance", "Stapler", 3.0, 12.0, false),
            ("Ops", "Pens", 20.0, 1.2, false),
        ]
    }

    pub fn records() -> Vec<RecordRef> {
        Self::data()
            .into_iter()
            .enumerate()
            .map(|(i, (dept, item, qty, price, urgent))| {
                Arc::new(Record::from_pairs([
                    ("orderId", Value::from((i + 1) as f64)),
                    ("department", Value::text(dept)),
                    ("item", Value::text(item)),
                    ("quantity", Value::from(qty)),
                    ("unitPrice", Value::from(price)),
                    ("urgent", Value::from(urgent)),
                ]))
            })
            .collect()
    }

    /// The same orders one period earlier: fewer Ops orders, no Legal, plus IT.
    pub fn previous_records() -> Vec<RecordRef> {
        [("Finance", 30.0), ("Ops", 50.0), ("IT", 8.0)]
            .iter()
            .map(|(dept, qty)| {
                Arc::new(Record::from_pairs([
                    ("department", Value::text(*dept)),
                    ("quantity", Value::from(*qty)),
                ]))
            })
            .collect()
    }

    /// `count` records cycling over departments A (40%), B (35%), C (25%).
    pub fn departments(count: usize) -> Vec<RecordRef> {
        (0..count)
            .map(|i| {
                let dept = match i % 20 {
                    0..=7 => "A",
                    8..=14 => "B",
                    _ => "C",
                };
                Arc::new(Record::from_pairs([
                    ("department", Value::text(dept)),
                    ("quantity", Value::from((i % 5 + 1) as f64)),
                ]))
            })
            .collect()
    }
}
