//! FILENAME: app/dashboard/src/report/commands.rs
//! PURPOSE: Command surface of the report builder.
//! CONTEXT: Every command locks the session, does one thing and returns a
//! serializable response; errors cross the boundary as strings.

use std::sync::MutexGuard;

use engine::{records_from_json, RecordRef};
use report_engine::{
    AggregationType, ChartData, ComparisonRow, ExportTable, FieldDescriptor, ReportConfig, ReportLayout, SortKey,
    ValidationIssue, ViewportWindow,
};

use crate::error::SessionError;
use crate::report::operations::ReportSession;
use crate::report::types::*;
use crate::{log_enter, log_enter_info, log_error, log_exit, log_exit_info, log_info, log_warn, DashboardState};

fn lock_session(state: &DashboardState) -> Result<MutexGuard<'_, ReportSession>, String> {
    state.session.lock().map_err(|e| {
        log_error!("SESSION", "session lock poisoned: {}", e);
        format!("Session lock poisoned: {}", e)
    })
}

// ============================================================================
// DATASET
// ============================================================================

pub fn load_dataset(state: &DashboardState, records: Vec<RecordRef>) -> Result<RefreshOutcome, String> {
    Ok(lock_session(state)?.load_dataset(records))
}

/// Parses a JSON array of flat objects and installs it as the dataset.
pub fn load_dataset_json(state: &DashboardState, json: &str) -> Result<RefreshOutcome, String> {
    let records = records_from_json(json).map_err(|e| SessionError::from(e).to_string())?;
    load_dataset(state, records)
}

pub fn set_reference_dataset(state: &DashboardState, records: Vec<RecordRef>) -> Result<(), String> {
    lock_session(state)?.set_reference_dataset(records);
    Ok(())
}

pub fn get_field_catalog(state: &DashboardState) -> Result<Vec<FieldDescriptor>, String> {
    Ok(lock_session(state)?.catalog().fields().to_vec())
}

// ============================================================================
// CONFIGURATION EDITS
// ============================================================================

pub fn get_report_config(state: &DashboardState) -> Result<ReportConfig, String> {
    Ok(lock_session(state)?.config().clone())
}

pub fn add_report_field(state: &DashboardState, field_id: &str) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    let catalog = session.catalog().clone();
    session.editor_mut().add_field(field_id, &catalog).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn remove_report_field(state: &DashboardState, field_id: &str) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().remove_field(field_id).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn move_report_field(state: &DashboardState, from: usize, to: usize) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().move_field(from, to).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn set_field_aggregation(
    state: &DashboardState,
    field_id: &str,
    aggregation: AggregationType,
) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_aggregation(field_id, aggregation).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn set_field_visibility(state: &DashboardState, field_id: &str, visible: bool) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_visible(field_id, visible).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

/// Returns the id assigned to the new filter.
pub fn add_report_filter(state: &DashboardState, request: FilterRequest) -> Result<String, String> {
    let mut session = lock_session(state)?;
    Ok(session.editor_mut().add_filter(request.field, request.operator, request.value))
}

pub fn update_report_filter(state: &DashboardState, filter_id: &str, request: FilterRequest) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session
        .editor_mut()
        .update_filter(filter_id, request.field, request.operator, request.value)
        .map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn remove_report_filter(state: &DashboardState, filter_id: &str) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().remove_filter(filter_id).map_err(|e| e.to_string())?;
    Ok(session.config().clone())
}

pub fn set_group_by(state: &DashboardState, group_by: Vec<String>) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_group_by(group_by);
    Ok(session.config().clone())
}

pub fn set_sort_by(state: &DashboardState, sort_by: Vec<SortKey>) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_sort_by(sort_by);
    Ok(session.config().clone())
}

pub fn set_report_layout(state: &DashboardState, layout: ReportLayout) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_layout(layout);
    Ok(session.config().clone())
}

pub fn set_report_name(state: &DashboardState, name: &str) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_name(name);
    Ok(session.config().clone())
}

pub fn set_report_description(state: &DashboardState, description: &str) -> Result<ReportConfig, String> {
    let mut session = lock_session(state)?;
    session.editor_mut().set_description(description);
    Ok(session.config().clone())
}

pub fn validate_report(state: &DashboardState) -> Result<Vec<ValidationIssue>, String> {
    let session = lock_session(state)?;
    Ok(session.editor().validate(session.catalog()))
}

// ============================================================================
// GENERATE & VIEW
// ============================================================================

pub fn generate_report(state: &DashboardState) -> Result<GenerateResponse, String> {
    log_enter_info!("REPORT", "generate_report");
    let mut session = lock_session(state)?;
    let cached = session.cached_result().is_some();
    let result = session.generate().map_err(|e| e.to_string())?;

    let response = GenerateResponse {
        row_count: result.rows.len(),
        filtered_count: result.filtered_count,
        source_count: result.source_count,
        totals: result.totals.clone(),
        ignored_fields: result.ignored_fields.clone(),
        display_mode: session.display_mode(),
        window: session.window(),
        cached,
    };
    log_exit_info!("REPORT", "generate_report", "rows={} cached={}", response.row_count, cached);
    Ok(response)
}

/// Scroll event: recomputes the window and returns its materialized rows.
pub fn scroll_report(state: &DashboardState, scroll_top: f64) -> Result<RowsResponse, String> {
    let mut session = lock_session(state)?;
    session.on_scroll(scroll_top);
    session.visible_rows().map_err(|e| e.to_string())
}

pub fn resize_report_viewport(state: &DashboardState, viewport_height: f64) -> Result<ViewportWindow, String> {
    Ok(lock_session(state)?.on_resize(viewport_height))
}

pub fn get_report_page(state: &DashboardState, page_index: usize) -> Result<PageResponse, String> {
    lock_session(state)?.page(page_index).map_err(|e| e.to_string())
}

pub fn get_chart_data(state: &DashboardState) -> Result<ChartData, String> {
    lock_session(state)?.chart().map_err(|e| e.to_string())
}

// ============================================================================
// SAVE, COMPARE, EXPORT
// ============================================================================

pub fn save_report(state: &DashboardState) -> Result<SavedReport, String> {
    log_enter!("STORE", "save_report");
    let session = lock_session(state)?;
    match session.save(state.store.as_ref()) {
        Ok(saved) => {
            log_exit!("STORE", "save_report", "id={}", saved.id);
            Ok(saved)
        }
        Err(e) => {
            log_warn!("STORE", "save_report rejected: {}", e);
            Err(e.to_string())
        }
    }
}

pub fn list_saved_reports(state: &DashboardState) -> Result<Vec<SavedReport>, String> {
    state.store.list().map_err(|e| e.to_string())
}

/// Opens a saved report in the editor. References to fields missing from
/// the current dataset are pruned.
pub fn open_saved_report(state: &DashboardState, id: &str) -> Result<ReportConfig, String> {
    let saved = state
        .store
        .get(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| SessionError::ReportNotFound(id.to_string()).to_string())?;
    let mut session = lock_session(state)?;
    session.open_config(saved.config);
    if !session.catalog().is_empty() {
        let catalog = session.catalog().clone();
        let pruned = session.editor_mut().reconcile(&catalog);
        if !pruned.is_empty() {
            log_info!("SESSION", "opened report {} with {} stale references pruned", id, pruned.len());
        }
    }
    Ok(session.config().clone())
}

pub fn delete_saved_report(state: &DashboardState, id: &str) -> Result<bool, String> {
    state.store.delete(id).map_err(|e| e.to_string())
}

pub fn compare_report(state: &DashboardState, request: CompareRequest) -> Result<ComparisonResponse, String> {
    let session = lock_session(state)?;
    let rows: Vec<ComparisonRow> = session
        .compare(&request.dimension, &request.metric)
        .map_err(|e| e.to_string())?;
    Ok(ComparisonResponse { dimension: request.dimension, metric: request.metric, rows })
}

pub fn export_report_table(state: &DashboardState) -> Result<ExportTable, String> {
    lock_session(state)?.export().map_err(|e| e.to_string())
}

pub fn export_comparison_table(state: &DashboardState, request: CompareRequest) -> Result<ExportTable, String> {
    lock_session(state)?
        .export_comparison(&request.dimension, &request.metric)
        .map_err(|e| e.to_string())
}
