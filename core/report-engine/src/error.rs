//! FILENAME: core/report-engine/src/error.rs

use thiserror::Error;

/// Misuse of the configuration editor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field already in report: {0}")]
    DuplicateField(String),

    #[error("Field position out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}
