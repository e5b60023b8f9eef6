//! Cleaned Table Module
//! Wraps a Polars DataFrame whose load-bearing columns have been sanitized.

use super::schema::{Dimension, Measure, TableSchema};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A cleaned on-risk extract.
///
/// After [`Table::from_raw`] every measure column exists and holds finite
/// `f64` values, every present dimension column is a non-null string column,
/// and no column name carries surrounding whitespace. Tables are never
/// mutated in place; filtering produces a new `Table`.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    schema: TableSchema,
}

impl Table {
    /// Run the cleaning pipeline over a freshly read DataFrame.
    pub fn from_raw(raw: DataFrame) -> PolarsResult<Self> {
        let height = raw.height();
        let mut seen: HashSet<String> = HashSet::new();
        let mut columns: Vec<Column> = Vec::with_capacity(raw.width() + Measure::ALL.len());

        for mut column in raw.take_columns() {
            let name = column.name().trim().to_string();
            if !seen.insert(name.clone()) {
                warn!(column = %name, "duplicate column name after trimming, dropping later copy");
                continue;
            }
            column.rename(name.into());
            columns.push(column);
        }

        let mut synthesized = Vec::new();
        for measure in Measure::ALL {
            let name = measure.column_name();
            match columns.iter().position(|c| c.name().as_str() == name) {
                Some(idx) => columns[idx] = coerce_measure(&columns[idx])?,
                None => {
                    columns.push(Column::new(name.into(), vec![0.0f64; height]));
                    synthesized.push(measure);
                }
            }
        }

        let mut dimensions = Vec::new();
        for dimension in Dimension::ALL {
            let name = dimension.column_name();
            if let Some(idx) = columns.iter().position(|c| c.name().as_str() == name) {
                columns[idx] = normalize_dimension(&columns[idx])?;
                dimensions.push(dimension);
            } else {
                debug!(column = name, "dimension column missing");
            }
        }

        let df = DataFrame::new(columns)?;
        Ok(Self {
            df,
            schema: TableSchema::new(dimensions, synthesized),
        })
    }

    /// Same schema, different rows. Used by the filter engine.
    pub(crate) fn with_rows(&self, df: DataFrame) -> Self {
        Self {
            df,
            schema: self.schema.clone(),
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn has(&self, dimension: Dimension) -> bool {
        self.schema.has(dimension)
    }

    /// Get list of column names.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// String values of a dimension, or `None` when the source lacks it.
    pub fn categorical(&self, dimension: Dimension) -> PolarsResult<Option<&StringChunked>> {
        if !self.schema.has(dimension) {
            return Ok(None);
        }
        let values = self.df.column(dimension.column_name())?.str()?;
        Ok(Some(values))
    }

    pub fn measure(&self, measure: Measure) -> PolarsResult<&Float64Chunked> {
        self.df.column(measure.column_name())?.f64()
    }

    /// Distinct values of a dimension in first-seen order; empty when absent.
    pub fn distinct_values(&self, dimension: Dimension) -> PolarsResult<Vec<String>> {
        let Some(values) = self.categorical(dimension)? else {
            return Ok(Vec::new());
        };

        let mut seen: HashSet<&str> = HashSet::new();
        Ok(values
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect())
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Parse a raw cell into a measure value. Anything unusable is zero.
pub fn parse_measure(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn coerce_measure(column: &Column) -> PolarsResult<Column> {
    let values: Vec<f64> = if is_numeric(column.dtype()) {
        column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect()
    } else {
        column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(parse_measure)
            .collect()
    };

    Ok(Column::new(column.name().clone(), values))
}

fn normalize_dimension(column: &Column) -> PolarsResult<Column> {
    let values: Vec<String> = column
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();

    Ok(Column::new(column.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{BRANCH_DESC, COB_DESC, DISCOUNT, PREMIUM_GROSS, TSI_OC};
    use anyhow::Result;

    #[test]
    fn parse_measure_maps_garbage_to_zero() {
        assert_eq!(parse_measure(Some("12.5")), 12.5);
        assert_eq!(parse_measure(Some("  7 ")), 7.0);
        assert_eq!(parse_measure(Some("-3")), -3.0);
        assert_eq!(parse_measure(Some("abc")), 0.0);
        assert_eq!(parse_measure(Some("")), 0.0);
        assert_eq!(parse_measure(Some("NaN")), 0.0);
        assert_eq!(parse_measure(Some("-inf")), 0.0);
        assert_eq!(parse_measure(None), 0.0);
    }

    #[test]
    fn cleans_names_measures_and_dimensions() -> Result<()> {
        let raw = df!(
            " PREMIUM_GROSS " => ["100", "abc", "50.5"],
            "TSI_OC" => [Some(1000.0), None, Some(f64::NAN)],
            "COB_DESC  " => [Some("Motor"), None, Some("Fire")],
            "POLICY_NO" => ["P1", "P2", "P3"]
        )?;

        let table = Table::from_raw(raw)?;

        let names = table.column_names();
        assert!(names.contains(&PREMIUM_GROSS.to_string()));
        assert!(names.contains(&COB_DESC.to_string()));
        assert!(names.iter().all(|n| n.trim() == n));

        let premium: Vec<f64> = table
            .measure(Measure::PremiumGross)?
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(premium, vec![100.0, 0.0, 50.5]);

        let tsi: Vec<Option<f64>> = table.measure(Measure::TsiOc)?.into_iter().collect();
        assert_eq!(tsi, vec![Some(1000.0), Some(0.0), Some(0.0)]);

        assert_eq!(
            table.distinct_values(Dimension::Cob)?,
            vec!["Motor".to_string(), String::new(), "Fire".to_string()]
        );
        Ok(())
    }

    #[test]
    fn synthesizes_missing_measures_but_not_dimensions() -> Result<()> {
        let raw = df!(
            TSI_OC => [1.0, 2.0],
            BRANCH_DESC => ["A", "B"]
        )?;

        let table = Table::from_raw(raw)?;

        assert!(table.schema().was_synthesized(Measure::Discount));
        assert!(table.schema().was_synthesized(Measure::PremiumGross));
        assert!(!table.schema().was_synthesized(Measure::TsiOc));
        let discount: Vec<f64> = table
            .measure(Measure::Discount)?
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(discount, vec![0.0, 0.0]);
        assert!(table.column_names().contains(&DISCOUNT.to_string()));

        assert!(table.has(Dimension::BranchDesc));
        assert!(!table.has(Dimension::Segment));
        assert!(table.categorical(Dimension::Segment)?.is_none());
        assert!(table.distinct_values(Dimension::Segment)?.is_empty());
        Ok(())
    }

    #[test]
    fn numeric_dimension_codes_become_text() -> Result<()> {
        let raw = df!("BRANCH" => [101i64, 102, 101])?;
        let table = Table::from_raw(raw)?;
        assert_eq!(
            table.distinct_values(Dimension::BranchCode)?,
            vec!["101".to_string(), "102".to_string()]
        );
        Ok(())
    }

    #[test]
    fn duplicate_names_after_trim_keep_first() -> Result<()> {
        let raw = df!(
            "SEGMENT" => ["Retail"],
            "SEGMENT " => ["Corporate"]
        )?;
        let table = Table::from_raw(raw)?;
        assert_eq!(
            table.distinct_values(Dimension::Segment)?,
            vec!["Retail".to_string()]
        );
        Ok(())
    }
}
