//! Report persistence.
//!
//! One JSON document per run. Writes go to a temporary sibling first and are
//! renamed into place, so a reader never sees a torn report.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::report::types::SweepReport;

/// File-name prefix of persisted reports.
pub const REPORT_PREFIX: &str = "multi-network-sweep-";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no reports found in {0}")]
    NotFound(String),
}

fn io_err(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Location of one run's report.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    path: PathBuf,
}

impl ReportStore {
    /// Store writing `multi-network-sweep-<unix millis>.json` under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(format!("{}{}.json", REPORT_PREFIX, Utc::now().timestamp_millis()));
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory and prove it accepts writes.
    pub fn verify_writable(&self) -> Result<(), ReportError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let check = self.dir.join(".sweep-write-check");
        fs::write(&check, b"ok").map_err(|e| io_err(&check, e))?;
        fs::remove_file(&check).map_err(|e| io_err(&check, e))?;
        Ok(())
    }

    /// Atomically write `report` to this store's path.
    pub fn persist(&self, report: &SweepReport) -> Result<PathBuf, ReportError> {
        let json = serde_json::to_vec_pretty(report)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(self.path.clone())
    }

    /// Best-effort intermediate write; failures are logged, not returned.
    pub fn checkpoint(&self, report: &SweepReport) {
        if let Err(e) = self.persist(report) {
            tracing::warn!(path = %self.path.display(), error = %e, "Report checkpoint failed");
        }
    }

    /// Write a sibling file with the same stem, e.g. a metrics snapshot.
    pub fn write_sidecar(&self, extension: &str, content: &str) -> Result<PathBuf, ReportError> {
        let path = self.path.with_extension(extension);
        fs::write(&path, content).map_err(|e| io_err(&path, e))?;
        Ok(path)
    }
}

/// Read a persisted report.
pub fn load_report(path: &Path) -> Result<SweepReport, ReportError> {
    let content = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Newest report in `dir`.
pub fn latest_report(dir: &Path) -> Result<PathBuf, ReportError> {
    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(REPORT_PREFIX) && name.ends_with(".json"))
        // Equal-length millisecond stamps sort lexicographically.
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .map(|name| dir.join(name))
        .ok_or_else(|| ReportError::NotFound(dir.display().to_string()))
}
