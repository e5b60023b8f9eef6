//! Stats module - grouping and aggregation

mod aggregator;

pub use aggregator::{AggregateError, AggregateRow, Aggregator, GroupTotals, GroupedSum};
