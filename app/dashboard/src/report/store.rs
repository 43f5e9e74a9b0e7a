//! FILENAME: app/dashboard/src/report/store.rs
//! PURPOSE: Persistence seam for saved reports.
//!
//! The session hands every saved report to a [`ReportStore`]. Two backends
//! ship here: an in-memory store for tests and embedding hosts, and a JSON
//! file store that rewrites one file per save.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::report::types::SavedReport;

pub trait ReportStore: Send + Sync {
    /// Inserts a report, replacing any report with the same id.
    fn save(&self, report: SavedReport) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Option<SavedReport>, StoreError>;

    /// All reports in save order.
    fn list(&self) -> Result<Vec<SavedReport>, StoreError>;

    /// Returns whether a report was removed.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

fn upsert(reports: &mut Vec<SavedReport>, report: SavedReport) {
    match reports.iter_mut().find(|r| r.id == report.id) {
        Some(existing) => *existing = report,
        None => reports.push(report),
    }
}

fn remove(reports: &mut Vec<SavedReport>, id: &str) -> bool {
    let before = reports.len();
    reports.retain(|r| r.id != id);
    reports.len() != before
}

// ============================================================================
// IN-MEMORY
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<SavedReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn save(&self, report: SavedReport) -> Result<(), StoreError> {
        let mut reports = self.reports.write().map_err(|_| StoreError::Poisoned)?;
        upsert(&mut reports, report);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SavedReport>, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::Poisoned)?;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<SavedReport>, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::Poisoned)?;
        Ok(reports.clone())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().map_err(|_| StoreError::Poisoned)?;
        Ok(remove(&mut reports, id))
    }
}

// ============================================================================
// JSON FILE
// ============================================================================

/// Keeps all reports in one JSON array file. The file is read on open and
/// rewritten after every change.
#[derive(Debug)]
pub struct JsonFileReportStore {
    path: PathBuf,
    reports: RwLock<Vec<SavedReport>>,
}

impl JsonFileReportStore {
    /// Opens the store at `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let reports = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            Vec::new()
        };
        Ok(JsonFileReportStore { path, reports: RwLock::new(reports) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, reports: &[SavedReport]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(reports)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl ReportStore for JsonFileReportStore {
    fn save(&self, report: SavedReport) -> Result<(), StoreError> {
        let mut reports = self.reports.write().map_err(|_| StoreError::Poisoned)?;
        upsert(&mut reports, report);
        self.flush(&reports)
    }

    fn get(&self, id: &str) -> Result<Option<SavedReport>, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::Poisoned)?;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<SavedReport>, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::Poisoned)?;
        Ok(reports.clone())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().map_err(|_| StoreError::Poisoned)?;
        let removed = remove(&mut reports, id);
        if removed {
            self.flush(&reports)?;
        }
        Ok(removed)
    }
}
