//! Data module - loading, cleaning, caching and filtering

mod cache;
mod filter;
mod loader;
pub mod schema;
mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::TableCache;
pub use filter::{filter, filter_by, FilterSelection};
pub use loader::{DataLoader, LoaderError, SourceCandidate, SourceFormat};
pub use schema::{Dimension, Measure};
pub use table::Table;
