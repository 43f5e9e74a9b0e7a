//! FILENAME: app/dashboard/src/lib.rs
// PURPOSE: Session layer of the ad-hoc report builder.
// CONTEXT: Hosts (desktop shell, server, tests) create one DashboardState and
// call the commands in `report::commands` against it.

use std::sync::{Arc, Mutex};

#[macro_use]
pub mod logging;
pub mod config;
pub mod error;
pub mod refresh;
pub mod report;

pub use config::{load_settings, save_settings, DashboardSettings};
pub use error::{SessionError, SettingsError, StoreError};
pub use logging::{init_log_file, next_seq, write_log, Level};
pub use refresh::{start_session_refresh, AutoRefresh};
pub use report::operations::{CompletedRun, Dataset, PendingRun, ReportSession};
pub use report::store::{InMemoryReportStore, JsonFileReportStore, ReportStore};
pub use report::types::*;

pub struct DashboardState {
    pub settings: DashboardSettings,
    pub session: Mutex<ReportSession>,
    /// Destination of saved reports.
    pub store: Arc<dyn ReportStore>,
}

/// State with an in-memory report store.
pub fn create_dashboard_state(settings: DashboardSettings) -> DashboardState {
    create_dashboard_state_with_store(settings, Arc::new(InMemoryReportStore::new()))
}

pub fn create_dashboard_state_with_store(settings: DashboardSettings, store: Arc<dyn ReportStore>) -> DashboardState {
    if let Some(path) = settings.log_file.as_deref() {
        if let Err(e) = init_log_file(path) {
            eprintln!("[LOG_INIT] {}", e);
        }
    }
    log_info!("SYS", "Creating DashboardState");
    DashboardState {
        session: Mutex::new(ReportSession::new(settings.clone())),
        settings,
        store,
    }
}
