//! Locating weekly tracking files in a data directory.
//!
//! Tracking data is distributed one file per week, named either
//! `tracking_week_<N>.csv` or `week<N>.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while scanning for tracking files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Week number encoded in a tracking file name.
///
/// Accepts `tracking_week_3.csv`, `week3.csv` and `week_3.csv`
/// (case-insensitive). Returns `None` for any other name.
pub fn week_from_path(path: &Path) -> Option<u32> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return None;
    }

    let stem = path.file_stem()?.to_str()?.to_lowercase();
    let rest = stem
        .strip_prefix("tracking_week")
        .or_else(|| stem.strip_prefix("week"))?;
    let digits = rest.strip_prefix('_').unwrap_or(rest);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Find weekly tracking files in `dir`, ordered by week number.
///
/// Only the top level of `dir` is scanned. Files whose names do not encode
/// a week are ignored.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory or cannot be read.
pub fn find_tracking_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut weekly: Vec<(u32, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| week_from_path(&path).map(|week| (week, path)))
        .collect();

    weekly.sort();
    log::debug!("{}: found {} tracking files", dir.display(), weekly.len());

    Ok(weekly.into_iter().map(|(_, path)| path).collect())
}
