//! Application services for reporting.

mod reports;

pub use reports::{ReportFilter, ReportService};
