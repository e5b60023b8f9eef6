//! Presentation Formatter
//! Display strings for summary metrics and the detail table.

use crate::stats::AggregateRow;
use serde::Serialize;

/// A detail-table row ready for display. The numeric source stays in
/// the [`AggregateRow`] it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub keys: Vec<String>,
    pub tsi_oc: String,
    pub premium_gross: String,
    pub discount: String,
    pub disc_ratio: String,
}

/// Fixed-point text with comma thousands separators.
/// Non-finite input prints as zero; negative zero prints without a sign.
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Summary metric: thousands separators, no decimals.
pub fn format_summary(value: f64) -> String {
    format_number(value, 0)
}

/// Table measure: thousands separators, two decimals.
pub fn format_amount(value: f64) -> String {
    format_number(value, 2)
}

pub fn format_ratio(value: f64) -> String {
    format!("{}%", format_number(value, 2))
}

pub fn format_table(rows: &[AggregateRow]) -> Vec<DisplayRow> {
    rows.iter()
        .map(|row| DisplayRow {
            keys: row.keys.clone(),
            tsi_oc: format_amount(row.tsi_oc),
            premium_gross: format_amount(row.premium_gross),
            discount: format_amount(row.discount),
            disc_ratio: format_ratio(row.disc_ratio),
        })
        .collect()
}
