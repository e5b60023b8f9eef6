//! On-Risk Dashboard - Insurance portfolio reporting
//!
//! Loads an on-risk extract, filters it by class of business, segment and
//! branch, and shows summary metrics, charts and a grouped detail table.

mod charts;
mod config;
mod data;
mod gui;
mod report;
mod stats;

use config::{DashboardConfig, DEFAULT_CONFIG_FILE};
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,onrisk_dashboard=debug"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DashboardConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?;
    info!(title = %config.title, "starting dashboard");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 900.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title(config.title.clone()),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "On-Risk Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}
