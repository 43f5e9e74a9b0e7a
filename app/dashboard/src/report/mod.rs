//! FILENAME: app/dashboard/src/report/mod.rs
pub mod types;
pub mod store;
pub mod operations;
pub mod commands;

pub use commands::*;
