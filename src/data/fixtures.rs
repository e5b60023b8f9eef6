//! Shared test tables.

use super::schema::*;
use super::table::Table;
use polars::prelude::*;

/// Seven policies across four branches.
///
/// Surabaya/Fire has zero premium with a non-zero discount, and Medan has
/// only zero-premium business.
pub fn raw_portfolio() -> PolarsResult<DataFrame> {
    df!(
        BRANCH_DESC => ["Jakarta", "Jakarta", "Jakarta", "Surabaya", "Surabaya", "Medan", "Bandung"],
        COB_DESC => ["Motor", "Motor", "Fire", "Motor", "Fire", "Marine", "Fire"],
        SEGMENT => ["Retail", "Retail", "Corporate", "Retail", "Corporate", "Corporate", "Retail"],
        TOC_DESCRIPTION => ["Private Car", "Private Car", "Warehouse", "Commercial Vehicle", "Warehouse", "Cargo", "Residential"],
        BRANCH => ["101", "101", "101", "102", "102", "103", "104"],
        TSI_OC => [1000.0, 500.0, 20000.0, 800.0, 0.0, 3000.0, 4000.0],
        PREMIUM_GROSS => [100.0, 50.0, 200.0, 80.0, 0.0, 0.0, 40.0],
        DISCOUNT => [10.0, 5.0, 0.0, 8.0, 3.0, 0.0, 4.0]
    )
}

pub fn portfolio() -> PolarsResult<Table> {
    Table::from_raw(raw_portfolio()?)
}

pub fn without_column(name: &str) -> PolarsResult<Table> {
    Table::from_raw(raw_portfolio()?.drop(name)?)
}
