//! FILENAME: app/dashboard/src/report/operations.rs
//! PURPOSE: The report session: dataset, catalog, editor and the last result.
//!
//! A session owns the last-known-good dataset and everything derived from
//! it. Pipeline runs are split into start / execute / commit so a host can
//! run the pure part elsewhere; only the most recently started run may be
//! committed.

use std::fmt::Display;
use std::sync::Arc;

use engine::RecordRef;
use report_engine::{
    chart_data, display_mode, export_comparison, export_report, run_comparison, run_report, ChartData,
    ComparisonRow, DisplayMode, ExportTable, FieldCatalog, ReportConfig, ReportEditor, ReportResult,
    ValidationErrors, Viewport, ViewportWindow,
};

use crate::config::DashboardSettings;
use crate::error::SessionError;
use crate::report::store::ReportStore;
use crate::report::types::{IndexedRow, PageResponse, RefreshOutcome, RowsResponse, SavedReport};
use crate::{log_debug, log_info, log_warn};

pub type Dataset = Arc<Vec<RecordRef>>;

/// Last committed result and the inputs it was computed from.
#[derive(Debug, Clone)]
struct Memo {
    generation: u64,
    config: ReportConfig,
    result: Arc<ReportResult>,
}

/// Everything a pipeline run needs, captured when the run starts.
#[derive(Debug, Clone)]
pub struct PendingRun {
    pub ticket: u64,
    pub generation: u64,
    records: Dataset,
    config: ReportConfig,
    catalog: FieldCatalog,
}

impl PendingRun {
    /// Runs filter -> aggregate -> sort. Pure; touches no session state.
    pub fn execute(self) -> CompletedRun {
        let result = run_report(&self.records, &self.config, &self.catalog);
        CompletedRun {
            ticket: self.ticket,
            generation: self.generation,
            config: self.config,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub ticket: u64,
    pub generation: u64,
    config: ReportConfig,
    result: Result<ReportResult, ValidationErrors>,
}

#[derive(Debug)]
pub struct ReportSession {
    settings: DashboardSettings,
    dataset: Dataset,
    generation: u64,
    catalog: FieldCatalog,
    reference: Option<Dataset>,
    editor: ReportEditor,
    memo: Option<Memo>,
    latest_ticket: u64,
    viewport: Viewport,
    page_index: usize,
}

impl ReportSession {
    pub fn new(settings: DashboardSettings) -> Self {
        let viewport = Viewport::new(settings.viewport_height, settings.row_height, settings.overscan);
        ReportSession {
            settings,
            dataset: Arc::new(Vec::new()),
            generation: 0,
            catalog: FieldCatalog::default(),
            reference: None,
            editor: ReportEditor::new("Untitled report"),
            memo: None,
            latest_ticket: 0,
            viewport,
            page_index: 0,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Bumped on every dataset replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn editor(&self) -> &ReportEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ReportEditor {
        &mut self.editor
    }

    pub fn config(&self) -> &ReportConfig {
        self.editor.config()
    }

    /// Replaces the editor, e.g. when a saved report is opened.
    pub fn open_config(&mut self, config: ReportConfig) {
        self.editor = ReportEditor::from_config(config);
    }

    // ========================================================================
    // DATASET
    // ========================================================================

    /// Installs a new dataset: bumps the generation, rebuilds the catalog and
    /// prunes configuration references to fields that no longer exist.
    pub fn load_dataset(&mut self, records: Vec<RecordRef>) -> RefreshOutcome {
        let catalog = FieldCatalog::from_records(&records);
        let removed = catalog.removed_since(&self.catalog);

        self.dataset = Arc::new(records);
        self.generation += 1;
        self.catalog = catalog;
        self.memo = None;

        // An empty dataset has an empty catalog; keep the configuration
        // intact until real data arrives again.
        let pruned = if self.catalog.is_empty() {
            Vec::new()
        } else {
            self.editor.reconcile(&self.catalog)
        };
        if !removed.is_empty() {
            log_warn!("SESSION", "fields removed from dataset: {}", removed.join(", "));
        }
        for reference in &pruned {
            log_info!("SESSION", "pruned {} ({})", reference.location, reference.field);
        }
        log_info!(
            "SESSION",
            "dataset generation={} records={} fields={}",
            self.generation,
            self.dataset.len(),
            self.catalog.len()
        );

        RefreshOutcome {
            applied: true,
            generation: self.generation,
            record_count: self.dataset.len(),
            pruned,
            error: None,
        }
    }

    /// Applies the outcome of a refresh callback. A failure keeps the
    /// last-known-good dataset, configuration and result.
    pub fn apply_refresh<E: Display>(&mut self, outcome: Result<Vec<RecordRef>, E>) -> RefreshOutcome {
        match outcome {
            Ok(records) => self.load_dataset(records),
            Err(e) => {
                let message = e.to_string();
                log_warn!("REFRESH", "refresh failed, keeping generation {}: {}", self.generation, message);
                RefreshOutcome {
                    applied: false,
                    generation: self.generation,
                    record_count: self.dataset.len(),
                    pruned: Vec::new(),
                    error: Some(message),
                }
            }
        }
    }

    /// Dataset of the reference period used by comparisons.
    pub fn set_reference_dataset(&mut self, records: Vec<RecordRef>) {
        log_info!("SESSION", "reference dataset records={}", records.len());
        self.reference = Some(Arc::new(records));
    }

    // ========================================================================
    // PIPELINE RUNS
    // ========================================================================

    /// Issues a new ticket and captures the current inputs. Any run started
    /// earlier becomes stale.
    pub fn start_run(&mut self) -> PendingRun {
        self.latest_ticket += 1;
        log_debug!("REPORT", "start run ticket={} generation={}", self.latest_ticket, self.generation);
        PendingRun {
            ticket: self.latest_ticket,
            generation: self.generation,
            records: Arc::clone(&self.dataset),
            config: self.editor.config().clone(),
            catalog: self.catalog.clone(),
        }
    }

    /// Installs a completed run. Runs superseded by a newer ticket, or
    /// computed against an older dataset, are refused and leave the current
    /// result untouched.
    pub fn commit(&mut self, run: CompletedRun) -> Result<Arc<ReportResult>, SessionError> {
        if run.ticket != self.latest_ticket || run.generation != self.generation {
            log_debug!("REPORT", "discarding stale run ticket={} latest={}", run.ticket, self.latest_ticket);
            return Err(SessionError::StaleRun { ticket: run.ticket, latest: self.latest_ticket });
        }
        let result = Arc::new(run.result?);
        self.viewport.set_row_count(result.rows.len());
        self.page_index = 0;
        self.memo = Some(Memo {
            generation: run.generation,
            config: run.config,
            result: Arc::clone(&result),
        });
        Ok(result)
    }

    /// Generates the report for the current configuration. An identical call
    /// (same dataset generation and configuration) returns the memoized result.
    pub fn generate(&mut self) -> Result<Arc<ReportResult>, SessionError> {
        if let Some(result) = self.cached_result() {
            log_debug!("REPORT", "generate served from memo generation={}", self.generation);
            return Ok(result);
        }
        let run = self.start_run().execute();
        let result = self.commit(run)?;
        log_info!(
            "REPORT",
            "generated rows={} filtered={} source={}",
            result.rows.len(),
            result.filtered_count,
            result.source_count
        );
        if !result.ignored_fields.is_empty() {
            log_warn!("REPORT", "ignored unknown fields: {}", result.ignored_fields.join(", "));
        }
        Ok(result)
    }

    /// The memoized result, if it matches the current inputs.
    pub fn cached_result(&self) -> Option<Arc<ReportResult>> {
        self.memo
            .as_ref()
            .filter(|m| m.generation == self.generation && &m.config == self.editor.config())
            .map(|m| Arc::clone(&m.result))
    }

    /// The last committed result, even if the configuration changed since.
    pub fn last_result(&self) -> Option<Arc<ReportResult>> {
        self.memo.as_ref().map(|m| Arc::clone(&m.result))
    }

    fn require_result(&self) -> Result<Arc<ReportResult>, SessionError> {
        self.last_result().ok_or(SessionError::NothingGenerated)
    }

    // ========================================================================
    // SAVE / COMPARE / EXPORT
    // ========================================================================

    /// Validates the configuration, assigns id and creation time, and hands
    /// the snapshot to the store.
    pub fn save(&self, store: &dyn ReportStore) -> Result<SavedReport, SessionError> {
        let config = self.editor.save(&self.catalog)?;
        let saved = SavedReport::new(config);
        store.save(saved.clone())?;
        log_info!("SESSION", "saved report id={} name={}", saved.id, saved.config.name);
        Ok(saved)
    }

    pub fn compare(&self, dimension: &str, metric: &str) -> Result<Vec<ComparisonRow>, SessionError> {
        let reference = self.reference.as_ref().ok_or(SessionError::NoReferenceDataset)?;
        let rows = run_comparison(&self.dataset, reference, self.editor.config(), &self.catalog, dimension, metric)?;
        log_info!("REPORT", "comparison dimension={} metric={} rows={}", dimension, metric, rows.len());
        Ok(rows)
    }

    pub fn export(&self) -> Result<ExportTable, SessionError> {
        let result = self.require_result()?;
        Ok(export_report(&result, self.editor.config(), &self.catalog))
    }

    pub fn export_comparison(&self, dimension: &str, metric: &str) -> Result<ExportTable, SessionError> {
        let rows = self.compare(dimension, metric)?;
        Ok(export_comparison(&rows, &self.catalog.label_of(dimension), &self.catalog.label_of(metric)))
    }

    pub fn chart(&self) -> Result<ChartData, SessionError> {
        let result = self.require_result()?;
        Ok(chart_data(&result.rows, self.editor.config().layout, &self.catalog))
    }

    // ========================================================================
    // VIEWPORT & PAGING
    // ========================================================================

    pub fn display_mode(&self) -> DisplayMode {
        let rows = self.last_result().map_or(0, |r| r.rows.len());
        display_mode(rows, self.settings.virtualize_threshold, self.settings.virtualization)
    }

    pub fn window(&self) -> ViewportWindow {
        self.viewport.window()
    }

    pub fn on_scroll(&mut self, scroll_top: f64) -> ViewportWindow {
        self.viewport.on_scroll(scroll_top)
    }

    pub fn on_resize(&mut self, viewport_height: f64) -> ViewportWindow {
        self.viewport.on_resize(viewport_height)
    }

    /// The materialized rows of the current window.
    pub fn visible_rows(&self) -> Result<RowsResponse, SessionError> {
        let result = self.require_result()?;
        let rows = self
            .viewport
            .rows(&result.rows)
            .iter()
            .map(|(index, row)| IndexedRow { index, row: row.clone() })
            .collect();
        Ok(RowsResponse { window: self.viewport.window(), rows })
    }

    pub fn page(&mut self, page_index: usize) -> Result<PageResponse, SessionError> {
        let result = self.require_result()?;
        let page = report_engine::paginate(&result.rows, self.settings.page_size, page_index);
        self.page_index = page.page_index;
        Ok(PageResponse {
            page_index: page.page_index,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_rows: page.total_rows,
            rows: page.rows.to_vec(),
        })
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }
}
