//! FILENAME: app/dashboard/src/error.rs

use report_engine::{EditError, ValidationErrors};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Run {ticket} superseded by run {latest}")]
    StaleRun { ticket: u64, latest: u64 },

    #[error("No report has been generated yet")]
    NothingGenerated,

    #[error("No reference dataset loaded for comparison")]
    NoReferenceDataset,

    #[error("Saved report not found: {0}")]
    ReportNotFound(String),

    #[error("Report store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
