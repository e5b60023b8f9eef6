//! Dashboard Main Application
//! Main window with control panel and dashboard viewer.

use crate::config::DashboardConfig;
use crate::data::{
    DataLoader, Dimension, FilterSelection, SourceCandidate, Table, TableCache,
};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::DashboardSnapshot;
use anyhow::Context;
use egui::SidePanel;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Source loading result from background thread
enum LoadResult {
    Complete {
        sources: Vec<SourceCandidate>,
        table: Table,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: TableCache,
    sources: Vec<SourceCandidate>,
    table: Option<Arc<Table>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async source loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let sources = config.sources.clone();
        let mut app = Self::idle(config);
        app.start_loading(sources);
        app
    }

    fn idle(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: TableCache::new(),
            sources: Vec::new(),
            table: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Use the cached table for `sources`, or read it on a worker thread.
    ///
    /// The current sources (and the path shown in the panel) only change
    /// once the new table is in hand.
    fn start_loading(&mut self, sources: Vec<SourceCandidate>) {
        if self.is_loading {
            warn!(sources = sources.len(), "load already running, request dropped");
            self.control_panel
                .set_status("Still loading the previous source, try again when it finishes");
            return;
        }

        if let Some(table) = self.cache.get(&sources) {
            self.use_sources(sources);
            self.set_table(table);
            return;
        }

        self.chart_viewer.clear();
        self.control_panel.clear_options();
        self.control_panel.set_status("Loading data...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match DataLoader::load(&sources) {
                Ok(table) => LoadResult::Complete { sources, table },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { sources, table }) => {
                let table = self.cache.insert(sources.clone(), table);
                info!(rows = table.height(), cached = self.cache.len(), "table ready");
                self.use_sources(sources);
                self.is_loading = false;
                self.set_table(table);
            }
            Ok(LoadResult::Error(e)) => {
                error!(error = %e, "data source unavailable");
                self.table = None;
                self.chart_viewer.clear();
                self.control_panel.set_status(&format!("Error: {}", e));
                self.is_loading = false;
            }
            // Put receiver back if still needed
            Err(std::sync::mpsc::TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: loader thread stopped");
                self.is_loading = false;
            }
        }
    }

    fn use_sources(&mut self, sources: Vec<SourceCandidate>) {
        self.control_panel.source_path = sources.first().map(|s| s.path.clone());
        self.sources = sources;
    }

    /// Reset filters to "everything" for a newly loaded table and redraw.
    fn set_table(&mut self, table: Arc<Table>) {
        let selection = match FilterSelection::all(&table, self.config.filter_toc) {
            Ok(selection) => selection,
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
                return;
            }
        };

        let mut options = BTreeMap::new();
        for dimension in [
            Dimension::Cob,
            Dimension::Segment,
            Dimension::BranchDesc,
            Dimension::Toc,
        ] {
            if selection.get(dimension).is_none() || !table.has(dimension) {
                continue;
            }
            match table.distinct_values(dimension) {
                Ok(values) => {
                    options.insert(dimension, values);
                }
                Err(e) => {
                    self.control_panel.set_status(&format!("Error: {}", e));
                    return;
                }
            }
        }

        self.control_panel.update_options(options, selection);
        self.table = Some(table);
        self.recompute();
    }

    /// Re-run filter, aggregation and formatting for the current selection.
    fn recompute(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        match DashboardSnapshot::build(table, &self.control_panel.selection, self.config.top_n) {
            Ok(snapshot) => {
                self.control_panel.set_status(&format!(
                    "{} of {} rows selected",
                    snapshot.row_count,
                    table.height()
                ));
                self.control_panel.export_enabled = true;
                self.chart_viewer.set_snapshot(snapshot);
            }
            Err(e) => {
                error!(error = %e, "dashboard computation failed");
                self.control_panel.set_status(&format!("Error: {}", e));
                self.control_panel.export_enabled = false;
                self.chart_viewer.clear();
            }
        }
    }

    /// Handle source file selection
    fn handle_browse_source(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheet / CSV", &["xls", "XLS", "xlsx", "xlsb", "ods", "csv"])
            .pick_file()
        {
            self.start_loading(vec![SourceCandidate::infer(path)]);
        }
    }

    /// Drop the cached table and read the current sources again.
    fn handle_reload(&mut self) {
        let sources = if self.sources.is_empty() {
            self.config.sources.clone()
        } else {
            self.sources.clone()
        };
        self.cache.invalidate(&sources);
        self.start_loading(sources);
    }

    fn handle_export_json(&mut self) {
        let Some(snapshot) = &self.chart_viewer.snapshot else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        // Ask user for output location
        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("onrisk_snapshot.json")
            .save_file()
        else {
            return; // User cancelled
        };

        match export_snapshot(snapshot, &output_path) {
            Ok(()) => {
                info!(path = %output_path.display(), "snapshot exported");
                self.control_panel
                    .set_status(&format!("Exported {}", output_path.display()));
            }
            Err(e) => {
                error!(error = %e, "snapshot export failed");
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }
}

fn export_snapshot(snapshot: &DashboardSnapshot, path: &Path) -> anyhow::Result<()> {
    let json = snapshot.to_json().context("serializing snapshot")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.config.title);

                    match action {
                        ControlPanelAction::BrowseSource => self.handle_browse_source(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::FiltersChanged => self.recompute(),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.config.title);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::portfolio;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn wait_for_load(app: &mut DashboardApp) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while app.is_loading && Instant::now() < deadline {
            app.check_load_results();
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn failed_or_dropped_loads_keep_current_source() -> Result<()> {
        let current = vec![SourceCandidate::delimited("lap_on_risk.csv")];
        let mut app = DashboardApp::idle(DashboardConfig::default());
        app.cache.insert(current.clone(), portfolio()?);

        app.start_loading(current.clone());
        assert_eq!(app.sources, current);
        assert_eq!(
            app.control_panel.source_path,
            Some(PathBuf::from("lap_on_risk.csv"))
        );
        assert!(app.table.is_some());

        // A pick made while another load runs is reported, not applied.
        app.is_loading = true;
        app.start_loading(vec![SourceCandidate::delimited("other.csv")]);
        assert!(app.control_panel.status.starts_with("Still loading"));
        assert_eq!(app.sources, current);
        app.is_loading = false;

        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("missing.csv");
        app.start_loading(vec![SourceCandidate::delimited(missing)]);
        wait_for_load(&mut app);

        assert!(!app.is_loading);
        assert!(app.control_panel.status.starts_with("Error"));
        assert_eq!(app.sources, current);
        assert_eq!(
            app.control_panel.source_path,
            Some(PathBuf::from("lap_on_risk.csv"))
        );
        Ok(())
    }

    #[test]
    fn export_writes_pretty_json() -> Result<()> {
        let table = portfolio()?;
        let selection = FilterSelection::all(&table, false)?;
        let snapshot = DashboardSnapshot::build(&table, &selection, 5)?;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("snapshot.json");
        export_snapshot(&snapshot, &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("\"premium_by_branch\""));
        Ok(())
    }
}
