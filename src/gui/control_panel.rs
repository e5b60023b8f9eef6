//! Control Panel Widget
//! Left side panel with the data source and the dashboard filters.

use crate::data::{Dimension, FilterSelection};
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeMap;
use std::path::PathBuf;

const FILTER_LIST_HEIGHT: f32 = 150.0;

/// Left side control panel with source selection and filter controls.
pub struct ControlPanel {
    pub source_path: Option<PathBuf>,
    /// Values offered by each selector, in first-seen order.
    pub options: BTreeMap<Dimension, Vec<String>>,
    pub selection: FilterSelection,
    pub export_enabled: bool,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source_path: None,
            options: BTreeMap::new(),
            selection: FilterSelection::default(),
            export_enabled: false,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selectors after a table load. Everything starts selected.
    pub fn update_options(
        &mut self,
        options: BTreeMap<Dimension, Vec<String>>,
        selection: FilterSelection,
    ) {
        self.options = options;
        self.selection = selection;
    }

    pub fn clear_options(&mut self) {
        self.options.clear();
        self.selection = FilterSelection::default();
        self.export_enabled = false;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, title: &str) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!("🛡 {}", title))
                    .size(20.0)
                    .color(Color32::from_rgb(99, 110, 250)),
            );
            ui.label(
                RichText::new("Portfolio monitoring")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let path_text = self
                    .source_path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file loaded".to_string());
                let path_color = if self.source_path.is_some() {
                    ui.visuals().text_color()
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(&path_text).size(12.0).color(path_color));

                ui.horizontal(|ui| {
                    if ui.button("📂 Browse").clicked() {
                        action = ControlPanelAction::BrowseSource;
                    }
                    if ui.button("🔄 Reload").clicked() {
                        action = ControlPanelAction::Reload;
                    }
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🎛 Dashboard Filters").size(14.0).strong());
        ui.add_space(5.0);

        if self.options.is_empty() {
            ui.label(RichText::new("Load data to enable filters").color(Color32::GRAY));
        }

        for (dimension, values) in &self.options {
            let Some(selected) = self.selection.get_mut(*dimension) else {
                continue;
            };

            let header = format!(
                "Select {} ({}/{})",
                dimension.label(),
                selected.len(),
                values.len()
            );
            ui.push_id(dimension.column_name(), |ui| {
                egui::CollapsingHeader::new(header)
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui.small_button("Select All").clicked() {
                                selected.extend(values.iter().cloned());
                                action = ControlPanelAction::FiltersChanged;
                            }
                            if ui.small_button("Clear All").clicked() {
                                selected.clear();
                                action = ControlPanelAction::FiltersChanged;
                            }
                        });

                        ScrollArea::vertical()
                            .max_height(FILTER_LIST_HEIGHT)
                            .show(ui, |ui| {
                                for value in values {
                                    let mut checked = selected.contains(value);
                                    let label = if value.is_empty() { "(blank)" } else { value.as_str() };
                                    if ui.checkbox(&mut checked, label).changed() {
                                        if checked {
                                            selected.insert(value.clone());
                                        } else {
                                            selected.remove(value);
                                        }
                                        action = ControlPanelAction::FiltersChanged;
                                    }
                                }
                            });
                    });
            });
            ui.add_space(5.0);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export Snapshot").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseSource,
    Reload,
    FiltersChanged,
    ExportJson,
}
