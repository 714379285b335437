//! Plain-text export of summaries.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::summary::Summary;

/// File name used when none is configured
pub const DEFAULT_FILE_NAME: &str = "summary.txt";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("nothing to export: summary is empty")]
    Empty,
}

/// Write the summary's visible text to `dir/file_name`, creating `dir` if
/// needed. Returns the written path.
pub fn write_summary(dir: &Path, file_name: &str, summary: &Summary) -> Result<PathBuf, ExportError> {
    if summary.is_empty() {
        return Err(ExportError::Empty);
    }

    let path = dir.join(file_name);
    let io_err = |source| ExportError::WriteError {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    std::fs::write(&path, summary.plain_text()).map_err(io_err)?;

    info!(path = %path.display(), "exported summary");
    Ok(path)
}
