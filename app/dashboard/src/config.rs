//! FILENAME: app/dashboard/src/config.rs
// PURPOSE: Dashboard settings loaded from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::log_info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    /// Fixed row height of the report table, in pixels.
    #[serde(default = "default_row_height")]
    pub row_height: f64,

    /// Initial viewport height until the host reports a resize.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,

    /// Rows rendered beyond each edge of the viewport.
    #[serde(default = "default_overscan")]
    pub overscan: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Row count above which the table switches to windowed rendering.
    #[serde(default = "default_virtualize_threshold")]
    pub virtualize_threshold: usize,

    #[serde(default = "default_virtualization")]
    pub virtualization: bool,

    /// Auto-refresh period in seconds; 0 disables it.
    #[serde(default)]
    pub auto_refresh_secs: u64,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_row_height() -> f64 {
    70.0
}
fn default_viewport_height() -> f64 {
    600.0
}
fn default_overscan() -> usize {
    5
}
fn default_page_size() -> usize {
    50
}
fn default_virtualize_threshold() -> usize {
    200
}
fn default_virtualization() -> bool {
    true
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
            viewport_height: default_viewport_height(),
            overscan: default_overscan(),
            page_size: default_page_size(),
            virtualize_threshold: default_virtualize_threshold(),
            virtualization: default_virtualization(),
            auto_refresh_secs: 0,
            log_file: None,
        }
    }
}

impl DashboardSettings {
    pub fn refresh_period(&self) -> Option<Duration> {
        if self.auto_refresh_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.auto_refresh_secs))
        }
    }
}

/// Reads settings from `path`. A missing file yields the defaults; a file
/// that exists but does not parse is an error.
pub fn load_settings(path: &Path) -> Result<DashboardSettings, SettingsError> {
    if !path.exists() {
        log_info!("CONFIG", "no settings at {:?}, using defaults", path);
        return Ok(DashboardSettings::default());
    }
    let text = std::fs::read_to_string(path)?;
    let settings: DashboardSettings = serde_json::from_str(&text)?;
    log_info!("CONFIG", "loaded settings from {:?}", path);
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &DashboardSettings) -> Result<(), SettingsError> {
    let text = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, text)?;
    Ok(())
}
