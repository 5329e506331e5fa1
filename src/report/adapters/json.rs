//! JSON snapshot exporter writing through a capability directory.

use crate::report::domain::ReportData;
use crate::report::ports::{ReportError, ReportRenderer};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::info;

/// Writes each report as pretty-printed JSON under a root directory.
///
/// Files are named `report_<YYYYmmdd_HHMMSS>.json` after the report's
/// generation time. The root directory is created when missing.
#[derive(Debug, Clone)]
pub struct JsonReportExporter {
    root: Utf8PathBuf,
}

impl JsonReportExporter {
    /// Creates an exporter rooted at `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the file name used for `data`.
    #[must_use]
    pub fn file_name(data: &ReportData) -> String {
        format!("report_{}.json", data.generated_at.format("%Y%m%d_%H%M%S"))
    }
}

fn write_file(root: &Utf8Path, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
    Dir::create_ambient_dir_all(root, ambient_authority())?;
    let dir = Dir::open_ambient_dir(root, ambient_authority())?;
    dir.write(file_name, bytes)
}

#[async_trait]
impl ReportRenderer for JsonReportExporter {
    async fn render(&self, data: &ReportData) -> Result<Utf8PathBuf, ReportError> {
        let bytes = serde_json::to_vec_pretty(data)?;
        let file_name = Self::file_name(data);
        let root = self.root.clone();
        let target = root.join(&file_name);

        tokio::task::spawn_blocking(move || write_file(&root, &file_name, &bytes))
            .await
            .map_err(|err| ReportError::io(std::io::Error::other(err)))?
            .map_err(ReportError::io)?;

        info!(path = %target, tasks = data.tasks.len(), "report exported");
        Ok(target)
    }
}
