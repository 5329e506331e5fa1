//! Rendering port for assembled reports.

use crate::report::domain::ReportData;
use crate::task::ports::TaskRepositoryError;
use crate::user::ports::UserRepositoryError;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Turns report data into an artefact on disk.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Renders `data` and returns the path of the written artefact.
    async fn render(&self, data: &ReportData) -> Result<Utf8PathBuf, ReportError>;
}

/// Errors raised while gathering or rendering a report.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// Loading tasks failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Loading users failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),

    /// Serializing the report failed.
    #[error("report encoding failed: {0}")]
    Encode(Arc<serde_json::Error>),

    /// Writing the artefact failed.
    #[error("report output failed: {0}")]
    Io(Arc<std::io::Error>),
}

impl ReportError {
    /// Wraps an I/O error.
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(Arc::new(err))
    }
}
