//! Aggregator Module
//! Grouped sums, summary totals and the discount ratio.

use crate::data::schema::{DISCOUNT, DISC_RATIO, PREMIUM_GROSS};
use crate::data::{Dimension, Measure, Table};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One group of the detail table.
///
/// `disc_ratio` is `discount / premium_gross * 100`, or `0` when the premium
/// sum is zero. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub keys: Vec<String>,
    pub tsi_oc: f64,
    pub premium_gross: f64,
    pub discount: f64,
    pub disc_ratio: f64,
}

/// A single measure summed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSum {
    pub key: String,
    pub total: f64,
}

/// Exposure and premium summed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotals {
    pub key: String,
    pub tsi_oc: f64,
    pub premium_gross: f64,
}

/// Stateless grouping and totals over a cleaned (usually filtered) table.
pub struct Aggregator;

impl Aggregator {
    /// Distinct branch descriptions with positive gross premium.
    pub fn total_active_branches(table: &Table) -> Result<usize, AggregateError> {
        Self::count_active(table, Dimension::BranchDesc)
    }

    /// Distinct branch codes with positive gross premium.
    pub fn legacy_active_branch_codes(table: &Table) -> Result<usize, AggregateError> {
        Self::count_active(table, Dimension::BranchCode)
    }

    fn count_active(table: &Table, dimension: Dimension) -> Result<usize, AggregateError> {
        let Some(values) = table.categorical(dimension)? else {
            return Ok(0);
        };
        let premium = table.measure(Measure::PremiumGross)?;

        // Blank cells were nulls in the source and are not a branch.
        let active: HashSet<&str> = values
            .into_iter()
            .zip(premium.into_iter())
            .filter_map(|(value, premium)| match (value, premium) {
                (Some(v), Some(p)) if p > 0.0 && !v.is_empty() => Some(v),
                _ => None,
            })
            .collect();

        Ok(active.len())
    }

    pub fn total_tsi(table: &Table) -> Result<f64, AggregateError> {
        Self::column_sum(table, Measure::TsiOc)
    }

    pub fn total_premium(table: &Table) -> Result<f64, AggregateError> {
        Self::column_sum(table, Measure::PremiumGross)
    }

    fn column_sum(table: &Table, measure: Measure) -> Result<f64, AggregateError> {
        Ok(table.measure(measure)?.into_iter().flatten().sum())
    }

    /// Group by `keys` in first-seen order and sum `measures`.
    fn group_sums(
        table: &Table,
        keys: &[Dimension],
        measures: &[Measure],
    ) -> Result<DataFrame, AggregateError> {
        let by: Vec<Expr> = keys.iter().map(|k| col(k.column_name())).collect();
        let aggs: Vec<Expr> = measures
            .iter()
            .map(|m| col(m.column_name()).sum())
            .collect();

        let grouped = table
            .dataframe()
            .clone()
            .lazy()
            .group_by_stable(by)
            .agg(aggs)
            .collect()?;
        Ok(grouped)
    }

    /// Sum one measure per value of `key`, sorted by key.
    /// Empty when the table lacks `key`.
    pub fn grouped_sum(
        table: &Table,
        key: Dimension,
        measure: Measure,
    ) -> Result<Vec<GroupedSum>, AggregateError> {
        let mut sums = Self::grouped_sum_first_seen(table, key, measure)?;
        sums.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(sums)
    }

    fn grouped_sum_first_seen(
        table: &Table,
        key: Dimension,
        measure: Measure,
    ) -> Result<Vec<GroupedSum>, AggregateError> {
        if !table.has(key) {
            return Ok(Vec::new());
        }

        let grouped = Self::group_sums(table, &[key], &[measure])?;
        let keys = grouped.column(key.column_name())?.str()?;
        let totals = grouped.column(measure.column_name())?.f64()?;

        Ok(keys
            .into_iter()
            .zip(totals.into_iter())
            .map(|(k, t)| GroupedSum {
                key: k.unwrap_or_default().to_string(),
                total: t.unwrap_or(0.0),
            })
            .collect())
    }

    /// The `n` groups with the largest summed `measure`, largest first.
    /// Equal sums keep the order in which their keys first appear.
    pub fn top_n_by_measure(
        table: &Table,
        key: Dimension,
        measure: Measure,
        n: usize,
    ) -> Result<Vec<GroupedSum>, AggregateError> {
        let mut sums = Self::grouped_sum_first_seen(table, key, measure)?;
        sums.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sums.truncate(n);
        Ok(sums)
    }

    /// TSI and gross premium per class of business, sorted by COB.
    pub fn cob_exposure(table: &Table) -> Result<Vec<GroupTotals>, AggregateError> {
        if !table.has(Dimension::Cob) {
            return Ok(Vec::new());
        }

        let grouped = Self::group_sums(
            table,
            &[Dimension::Cob],
            &[Measure::TsiOc, Measure::PremiumGross],
        )?;
        let keys = grouped.column(Dimension::Cob.column_name())?.str()?;
        let tsi = grouped.column(Measure::TsiOc.column_name())?.f64()?;
        let premium = grouped.column(Measure::PremiumGross.column_name())?.f64()?;

        let mut totals: Vec<GroupTotals> = keys
            .into_iter()
            .zip(tsi.into_iter())
            .zip(premium.into_iter())
            .map(|((k, t), p)| GroupTotals {
                key: k.unwrap_or_default().to_string(),
                tsi_oc: t.unwrap_or(0.0),
                premium_gross: p.unwrap_or(0.0),
            })
            .collect();
        totals.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(totals)
    }

    /// Sum all measures per `group_keys` tuple and derive `Disc_Ratio`.
    ///
    /// Keys the table lacks are skipped; with no usable key the result is
    /// empty. Rows are sorted by their key tuple.
    pub fn aggregate(
        table: &Table,
        group_keys: &[Dimension],
    ) -> Result<Vec<AggregateRow>, AggregateError> {
        let keys: Vec<Dimension> = group_keys
            .iter()
            .copied()
            .filter(|k| table.has(*k))
            .collect();
        if keys.is_empty() {
            debug!("no grouping keys present, detail table is empty");
            return Ok(Vec::new());
        }

        let grouped = Self::group_sums(table, &keys, &Measure::ALL)?
            .lazy()
            .with_column(
                when(col(PREMIUM_GROSS).neq(lit(0.0)))
                    .then(col(DISCOUNT) / col(PREMIUM_GROSS) * lit(100.0))
                    .otherwise(lit(0.0))
                    .alias(DISC_RATIO),
            )
            .collect()?;

        let key_columns = keys
            .iter()
            .map(|k| grouped.column(k.column_name()).and_then(|c| c.str()))
            .collect::<PolarsResult<Vec<&StringChunked>>>()?;
        let tsi = grouped.column(Measure::TsiOc.column_name())?.f64()?;
        let premium = grouped.column(Measure::PremiumGross.column_name())?.f64()?;
        let discount = grouped.column(Measure::Discount.column_name())?.f64()?;
        let ratio = grouped.column(DISC_RATIO)?.f64()?;

        let mut rows: Vec<AggregateRow> = (0..grouped.height())
            .map(|i| AggregateRow {
                keys: key_columns
                    .iter()
                    .map(|ca| ca.get(i).unwrap_or_default().to_string())
                    .collect(),
                tsi_oc: tsi.get(i).unwrap_or(0.0),
                premium_gross: premium.get(i).unwrap_or(0.0),
                discount: discount.get(i).unwrap_or(0.0),
                disc_ratio: ratio.get(i).unwrap_or(0.0),
            })
            .collect();
        rows.sort_by(|a, b| a.keys.cmp(&b.keys));

        debug!(groups = rows.len(), keys = keys.len(), "aggregated detail table");
        Ok(rows)
    }
}
