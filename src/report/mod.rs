//! Report module - display formatting and dashboard snapshots

mod dashboard;
mod formatter;

pub use dashboard::DashboardSnapshot;
pub use formatter::DisplayRow;
