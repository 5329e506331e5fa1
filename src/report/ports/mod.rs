//! Port contracts for report output.

mod renderer;

#[cfg(test)]
pub use renderer::MockReportRenderer;
pub use renderer::{ReportError, ReportRenderer};
