//! Chart Viewer Widget
//! Central scrollable panel showing metrics, charts and the detail table.

use crate::charts::DashboardPlotter;
use crate::report::DashboardSnapshot;
use egui::{RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;

/// Displays the current dashboard snapshot.
#[derive(Default)]
pub struct ChartViewer {
    pub snapshot: Option<DashboardSnapshot>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn set_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, title: &str) {
        let Some(snapshot) = &self.snapshot else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(title).size(26.0).strong());
                ui.label(format!("{} policies in the current selection", snapshot.row_count));
                ui.separator();

                // Top row: metrics
                ui.horizontal(|ui| {
                    let legacy = format!("{} active branch codes", snapshot.summary.active_branch_codes);
                    DashboardPlotter::draw_metric_card(
                        ui,
                        "Total Active Branches",
                        &snapshot.summary.active_branches.to_string(),
                        Some(&legacy),
                    );
                    DashboardPlotter::draw_metric_card(
                        ui,
                        "Total TSI (OC)",
                        &snapshot.summary.total_tsi_display,
                        None,
                    );
                    DashboardPlotter::draw_metric_card(
                        ui,
                        "Total Premium Gross",
                        &snapshot.summary.total_premium_display,
                        None,
                    );
                });
                ui.add_space(SECTION_SPACING);

                // Middle row: bar charts
                ui.columns(2, |columns| {
                    columns[0].label(RichText::new("On Risk by Branch").size(16.0).strong());
                    DashboardPlotter::draw_branch_bars(&mut columns[0], &snapshot.premium_by_branch);

                    columns[1].label(RichText::new("TSI vs Premium per COB").size(16.0).strong());
                    DashboardPlotter::draw_cob_bars(&mut columns[1], &snapshot.cob_exposure);
                });
                ui.add_space(SECTION_SPACING);
                ui.separator();

                // Bottom row: distributions
                ui.label(RichText::new("Portfolio Distribution").size(18.0).strong());
                ui.columns(3, |columns| {
                    columns[0].label(RichText::new("Top Branches by Premium").strong());
                    DashboardPlotter::draw_donut(&mut columns[0], &snapshot.top_branches);

                    columns[1].label(RichText::new("Segment Distribution").strong());
                    DashboardPlotter::draw_donut(&mut columns[1], &snapshot.segment_distribution);

                    columns[2].label(RichText::new("Top TOC Description").strong());
                    match &snapshot.top_toc {
                        Some(series) => DashboardPlotter::draw_donut(&mut columns[2], series),
                        None => {
                            columns[2].label("No TOC column in this extract");
                        }
                    }
                });
                ui.add_space(SECTION_SPACING);
                ui.separator();

                ui.label(RichText::new("📋 Detailed Transaction Summary").size(18.0).strong());
                DashboardPlotter::draw_detail_table(
                    ui,
                    &snapshot.detail_keys,
                    &snapshot.detail_display,
                );
            });
    }
}
