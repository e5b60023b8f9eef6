//! Dashboard Snapshot
//! One full pipeline run (filter, aggregate, format) packaged for rendering.

use super::formatter::{format_summary, format_table, DisplayRow};
use crate::data::{filter, Dimension, FilterSelection, Measure, Table};
use crate::stats::{AggregateError, AggregateRow, Aggregator, GroupTotals, GroupedSum};
use serde::Serialize;
use tracing::debug;

/// Headline metrics, raw and formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub active_branches: usize,
    pub active_branch_codes: usize,
    pub total_tsi: f64,
    pub total_premium: f64,
    pub total_tsi_display: String,
    pub total_premium_display: String,
}

/// Everything the rendering layer draws for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub row_count: usize,
    pub summary: SummaryMetrics,
    /// Premium per branch (bar chart).
    pub premium_by_branch: Vec<GroupedSum>,
    /// TSI and premium per COB (grouped horizontal bars).
    pub cob_exposure: Vec<GroupTotals>,
    pub top_branches: Vec<GroupedSum>,
    pub segment_distribution: Vec<GroupedSum>,
    /// `None` when the table has no TOC description column.
    pub top_toc: Option<Vec<GroupedSum>>,
    /// Column labels for `detail` keys.
    pub detail_keys: Vec<String>,
    pub detail: Vec<AggregateRow>,
    pub detail_display: Vec<DisplayRow>,
}

impl DashboardSnapshot {
    /// Filter `table` by `selection` and compute every series.
    pub fn build(
        table: &Table,
        selection: &FilterSelection,
        top_n: usize,
    ) -> Result<Self, AggregateError> {
        let filtered = filter(table, selection)?;
        let snapshot = Self::from_filtered(&filtered, top_n)?;
        debug!(
            rows = snapshot.row_count,
            groups = snapshot.detail.len(),
            "dashboard snapshot built"
        );
        Ok(snapshot)
    }

    fn from_filtered(table: &Table, top_n: usize) -> Result<Self, AggregateError> {
        let total_tsi = Aggregator::total_tsi(table)?;
        let total_premium = Aggregator::total_premium(table)?;
        let summary = SummaryMetrics {
            active_branches: Aggregator::total_active_branches(table)?,
            active_branch_codes: Aggregator::legacy_active_branch_codes(table)?,
            total_tsi,
            total_premium,
            total_tsi_display: format_summary(total_tsi),
            total_premium_display: format_summary(total_premium),
        };

        let top_toc = if table.has(Dimension::Toc) {
            Some(Aggregator::top_n_by_measure(
                table,
                Dimension::Toc,
                Measure::PremiumGross,
                top_n,
            )?)
        } else {
            None
        };

        let keys = table.schema().detail_keys();
        let detail = Aggregator::aggregate(table, &keys)?;
        let detail_display = format_table(&detail);

        Ok(Self {
            row_count: table.height(),
            summary,
            premium_by_branch: Aggregator::grouped_sum(
                table,
                Dimension::BranchDesc,
                Measure::PremiumGross,
            )?,
            cob_exposure: Aggregator::cob_exposure(table)?,
            top_branches: Aggregator::top_n_by_measure(
                table,
                Dimension::BranchDesc,
                Measure::PremiumGross,
                top_n,
            )?,
            segment_distribution: Aggregator::grouped_sum(
                table,
                Dimension::Segment,
                Measure::PremiumGross,
            )?,
            top_toc,
            detail_keys: keys.iter().map(|k| k.column_name().to_string()).collect(),
            detail,
            detail_display,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
