//! CSV writers for nearest-opponent results and per-play summaries.
//!
//! Column names follow the camelCase convention of the tracking input files
//! so results can be joined back onto them.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::transforms::PlaySummary;
use crate::processors::proximity::NearestOpponentResult;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a CSV writer over a buffered file, creating parent directories.
fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

/// Write all rows and flush, mapping errors to the output path.
fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(header)
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for row in rows {
        csv_writer
            .write_record(&row)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write nearest-opponent results to CSV.
///
/// Header: `gameId,playId,frameId,nflId,nearestNflId,nearestDisplayName,
/// nearestX,nearestY,distance`. Coordinates and distances are written with
/// four decimals.
///
/// # Errors
///
/// Returns an error if parent directories cannot be created or the file
/// cannot be written.
///
/// # Example
///
/// ```no_run
/// use gridiron_tracking::core::writers::write_nearest_csv;
/// use std::path::Path;
///
/// write_nearest_csv(Path::new("nearest.csv"), &[]).unwrap();
/// ```
pub fn write_nearest_csv(path: &Path, results: &[NearestOpponentResult]) -> Result<()> {
    write_rows(
        path,
        &[
            "gameId",
            "playId",
            "frameId",
            "nflId",
            "nearestNflId",
            "nearestDisplayName",
            "nearestX",
            "nearestY",
            "distance",
        ],
        results.iter().map(|r| {
            vec![
                r.game_id.to_string(),
                r.play_id.to_string(),
                r.frame_id.to_string(),
                r.player_id.to_string(),
                r.nearest_player_id.to_string(),
                r.nearest_display_name.clone(),
                format!("{:.4}", r.nearest_x),
                format!("{:.4}", r.nearest_y),
                format!("{:.4}", r.distance),
            ]
        }),
    )
}

/// Write per-play distance summaries to CSV.
///
/// Missing play metadata is written as empty cells.
pub fn write_play_summary_csv(path: &Path, summaries: &[PlaySummary]) -> Result<()> {
    write_rows(
        path,
        &[
            "gameId",
            "playId",
            "possessionTeam",
            "passResult",
            "frames",
            "results",
            "meanDistance",
            "minDistance",
            "maxDistance",
        ],
        summaries.iter().map(|s| {
            vec![
                s.game_id.to_string(),
                s.play_id.to_string(),
                s.possession_team.clone().unwrap_or_default(),
                s.pass_result.clone().unwrap_or_default(),
                s.frames.to_string(),
                s.results.to_string(),
                format!("{:.4}", s.mean_distance),
                format!("{:.4}", s.min_distance),
                format!("{:.4}", s.max_distance),
            ]
        }),
    )
}
