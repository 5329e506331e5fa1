//! Report renderer implementations.

mod json;

pub use json::JsonReportExporter;
