//! Dashboard configuration, read from an optional JSON file.

use crate::data::SourceCandidate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Reporting period the default source files are named after.
pub const REPORT_PERIOD: &str = "lap_on_risk_28_feb_26";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Tried in order; the first readable one is used.
    pub sources: Vec<SourceCandidate>,
    /// Size of the "top" breakdowns.
    pub top_n: usize,
    /// Show a fourth selector on TOC description when the column exists.
    pub filter_toc: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "On Risk Dashboard".to_string(),
            sources: vec![
                SourceCandidate::spreadsheet(format!("{REPORT_PERIOD}.XLS")),
                SourceCandidate::delimited(format!("{REPORT_PERIOD}.csv")),
            ],
            top_n: 5,
            filter_toc: false,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        info!(path = %path.display(), sources = config.sources.len(), "config loaded");
        Ok(config)
    }
}
