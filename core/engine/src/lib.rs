//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the record model.
//! CONTEXT: Re-exports the value and record types shared by the report engine
//! and the dashboard session layer.

pub mod record;
pub mod value;

// Re-export commonly used types at the crate root
pub use record::{records_from_json, Record, RecordRef};
pub use value::{format_number, parse_number, Value};
