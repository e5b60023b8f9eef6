//! Chart Plotter Module
//! Draws dashboard series using egui_plot and the egui painter.

use crate::report::DisplayRow;
use crate::stats::{GroupTotals, GroupedSum};
use egui::{Color32, Pos2, RichText, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, Legend, Plot};

pub const PREMIUM_COLOR: Color32 = Color32::from_rgb(239, 85, 59);
pub const TSI_COLOR: Color32 = Color32::from_rgb(0, 204, 150);
pub const BRANCH_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

pub const PALETTE: [Color32; 8] = [
    Color32::from_rgb(102, 197, 204), // Teal
    Color32::from_rgb(246, 207, 113), // Sand
    Color32::from_rgb(248, 156, 116), // Peach
    Color32::from_rgb(220, 176, 242), // Lilac
    Color32::from_rgb(135, 197, 95),  // Green
    Color32::from_rgb(158, 185, 243), // Sky
    Color32::from_rgb(254, 136, 177), // Pink
    Color32::from_rgb(201, 219, 116), // Lime
];

const CHART_HEIGHT: f32 = 280.0;
const DONUT_SIZE: f32 = 180.0;
/// Inner radius as a share of the outer radius.
const DONUT_HOLE: f32 = 0.6;
/// Max arc per painted segment, in radians.
const DONUT_STEP: f32 = 0.05;

/// Draws the dashboard widgets.
pub struct DashboardPlotter;

impl DashboardPlotter {
    /// Get color for the i-th slice of a distribution.
    pub fn slice_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Share of `value` in `total` as a percentage, 0 for an empty total.
    pub fn share(value: f64, total: f64) -> f64 {
        if total > 0.0 {
            value / total * 100.0
        } else {
            0.0
        }
    }

    pub fn draw_metric_card(ui: &mut egui::Ui, label: &str, value: &str, note: Option<&str>) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(12.0)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.set_min_width(220.0);
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(26.0).strong());
                if let Some(note) = note {
                    ui.label(RichText::new(note).size(11.0).color(Color32::GRAY));
                }
            });
    }

    /// Vertical bars, one per group.
    pub fn draw_branch_bars(ui: &mut egui::Ui, series: &[GroupedSum]) {
        if series.is_empty() {
            Self::draw_no_data(ui);
            return;
        }

        let labels: Vec<String> = series.iter().map(|g| g.key.clone()).collect();
        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Bar::new(i as f64, g.total)
                    .name(&g.key)
                    .width(0.6)
                    .fill(BRANCH_COLOR)
            })
            .collect();

        Plot::new("premium_by_branch")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Premium Gross")
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Premium Gross"));
            });
    }

    /// Horizontal TSI and premium bars side by side per group.
    pub fn draw_cob_bars(ui: &mut egui::Ui, series: &[GroupTotals]) {
        if series.is_empty() {
            Self::draw_no_data(ui);
            return;
        }

        let labels: Vec<String> = series.iter().map(|g| g.key.clone()).collect();
        let tsi: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, g)| Bar::new(i as f64 - 0.2, g.tsi_oc).name(&g.key).width(0.4))
            .collect();
        let premium: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Bar::new(i as f64 + 0.2, g.premium_gross)
                    .name(&g.key)
                    .width(0.4)
            })
            .collect();

        Plot::new("tsi_vs_premium")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(tsi)
                        .horizontal()
                        .color(TSI_COLOR)
                        .name("TSI OC"),
                );
                plot_ui.bar_chart(
                    BarChart::new(premium)
                        .horizontal()
                        .color(PREMIUM_COLOR)
                        .name("Premium Gross"),
                );
            });
    }

    fn category_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if idx < 0.0 || (value - idx).abs() > 0.01 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Ring chart with a legend of shares below it.
    pub fn draw_donut(ui: &mut egui::Ui, series: &[GroupedSum]) {
        let total: f64 = series.iter().map(|g| g.total.max(0.0)).sum();
        if series.is_empty() || total <= 0.0 {
            Self::draw_no_data(ui);
            return;
        }

        let (rect, _) = ui.allocate_exact_size(egui::vec2(DONUT_SIZE, DONUT_SIZE), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let outer = DONUT_SIZE / 2.0 - 4.0;
        let inner = outer * DONUT_HOLE;

        let mut start = -std::f32::consts::FRAC_PI_2;
        for (i, group) in series.iter().enumerate() {
            let sweep = (group.total.max(0.0) / total) as f32 * std::f32::consts::TAU;
            let color = Self::slice_color(i);

            // Each step is a thin quad, which keeps every polygon convex.
            let steps = ((sweep / DONUT_STEP).ceil() as usize).max(1);
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                let points = vec![
                    polar(center, outer, a0),
                    polar(center, outer, a1),
                    polar(center, inner, a1),
                    polar(center, inner, a0),
                ];
                painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
            }
            start += sweep;
        }

        for (i, group) in series.iter().enumerate() {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                ui.painter().rect_filled(rect, 3.0, Self::slice_color(i));
                let name = if group.key.is_empty() { "(blank)" } else { group.key.as_str() };
                ui.label(
                    RichText::new(format!(
                        "{} ({:.1}%)",
                        name,
                        Self::share(group.total, total)
                    ))
                    .size(12.0),
                );
            });
        }
    }

    /// Detail table
    pub fn draw_detail_table(ui: &mut egui::Ui, key_labels: &[String], rows: &[DisplayRow]) {
        if rows.is_empty() {
            Self::draw_no_data(ui);
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("detail_table")
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        // Headers
                        for label in key_labels {
                            ui.label(RichText::new(label).strong().size(12.0));
                        }
                        for label in ["TSI_OC", "PREMIUM_GROSS", "DISCOUNT", "Disc_Ratio"] {
                            ui.label(RichText::new(label).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            for key in &row.keys {
                                ui.label(RichText::new(key).size(12.0));
                            }
                            for value in [&row.tsi_oc, &row.premium_gross, &row.discount, &row.disc_ratio] {
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| ui.label(RichText::new(value).size(12.0).monospace()),
                                );
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn draw_no_data(ui: &mut egui::Ui) {
        ui.label(RichText::new("No data").size(14.0).color(Color32::GRAY));
    }
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + egui::vec2(radius * angle.cos(), radius * angle.sin())
}
