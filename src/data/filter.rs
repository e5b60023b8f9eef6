//! Filter Engine
//! Row subsets of a table by categorical selections.

use super::schema::Dimension;
use super::table::Table;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Chosen values per filterable dimension.
///
/// An empty set matches nothing. A dimension the table lacks is never
/// filtered, whatever its set holds. `toc` is `None` when the optional
/// fourth selector is not in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub cob: HashSet<String>,
    pub segment: HashSet<String>,
    pub branch: HashSet<String>,
    pub toc: Option<HashSet<String>>,
}

impl FilterSelection {
    /// Every distinct value of every filterable dimension.
    pub fn all(table: &Table, with_toc: bool) -> PolarsResult<Self> {
        let values = |d: Dimension| -> PolarsResult<HashSet<String>> {
            Ok(table.distinct_values(d)?.into_iter().collect())
        };

        let toc = if with_toc && table.has(Dimension::Toc) {
            Some(values(Dimension::Toc)?)
        } else {
            None
        };

        Ok(Self {
            cob: values(Dimension::Cob)?,
            segment: values(Dimension::Segment)?,
            branch: values(Dimension::BranchDesc)?,
            toc,
        })
    }

    pub fn get(&self, dimension: Dimension) -> Option<&HashSet<String>> {
        match dimension {
            Dimension::Cob => Some(&self.cob),
            Dimension::Segment => Some(&self.segment),
            Dimension::BranchDesc => Some(&self.branch),
            Dimension::Toc => self.toc.as_ref(),
            Dimension::BranchCode => None,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> Option<&mut HashSet<String>> {
        match dimension {
            Dimension::Cob => Some(&mut self.cob),
            Dimension::Segment => Some(&mut self.segment),
            Dimension::BranchDesc => Some(&mut self.branch),
            Dimension::Toc => self.toc.as_mut(),
            Dimension::BranchCode => None,
        }
    }

    fn constraints(&self) -> impl Iterator<Item = (Dimension, &HashSet<String>)> {
        [
            Dimension::Cob,
            Dimension::Segment,
            Dimension::BranchDesc,
            Dimension::Toc,
        ]
        .into_iter()
        .filter_map(|d| self.get(d).map(|set| (d, set)))
    }
}

/// Keep rows whose value in every constrained, present dimension is selected.
/// Row order and columns are preserved.
pub fn filter(table: &Table, selection: &FilterSelection) -> PolarsResult<Table> {
    let mut keep = vec![true; table.height()];

    for (dimension, selected) in selection.constraints() {
        let Some(values) = table.categorical(dimension)? else {
            continue;
        };
        for (flag, value) in keep.iter_mut().zip(values.into_iter()) {
            if *flag {
                *flag = value.is_some_and(|v| selected.contains(v));
            }
        }
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let df = table.dataframe().filter(&mask)?;
    debug!(rows_in = table.height(), rows_out = df.height(), "filter applied");
    Ok(table.with_rows(df))
}

/// Three-selector form of [`filter`].
pub fn filter_by(
    table: &Table,
    selected_cob: &HashSet<String>,
    selected_segment: &HashSet<String>,
    selected_branch: &HashSet<String>,
) -> PolarsResult<Table> {
    let selection = FilterSelection {
        cob: selected_cob.clone(),
        segment: selected_segment.clone(),
        branch: selected_branch.clone(),
        toc: None,
    };
    filter(table, &selection)
}
