use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Builds the download/export file name `<category>-<unix-timestamp>.csv`
pub fn export_file_name(category_id: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.csv", category_id, at.timestamp())
}

/// Writes CSV text into `dir`, creating the directory if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Directory creation or write failed
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(file_name);
    fs::write(&path, content)?;

    tracing::info!("Exported {} bytes to {}", content.len(), path.display());
    Ok(path)
}
