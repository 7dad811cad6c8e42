//! Nearest-opponent distances for player-tracking frames.
//!
//! For every player in every frame, finds the closest player on the other
//! team and the Euclidean distance to them. Records are grouped by
//! `(game, play, frame)` and each group is scanned independently:
//!
//! - Groups are split by team side
//! - Each player is compared against every opponent in the group
//! - Ties on distance go to the lowest opponent player id
//!
//! The scan is O(n²) per group. A play frame holds about 22 players, so this
//! is cheap for tracking data, but it does not scale to large groups; groups
//! above [`ProximityConfig::large_group_warning`] are logged.
//!
//! Groups are independent and are processed on the rayon pool when
//! [`ProximityConfig::parallel`] is set. Output is identical either way.
//!
//! # Example
//!
//! ```no_run
//! use gridiron_tracking::core::loaders::PositionRecord;
//! use gridiron_tracking::processors::proximity::NearestOpponentComputer;
//!
//! let records: Vec<PositionRecord> = Vec::new();
//! let report = NearestOpponentComputer::default().compute(&records).unwrap();
//! println!("{} results", report.results.len());
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result as AnyResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{IngestConfig, PipelineConfig, ProximityConfig};
use crate::core::loaders::{
    load_tracking_csv, to_position_records, FrameKey, GameInfo, IngestStats, PositionRecord,
    TeamSide,
};
use crate::core::transforms::normalize_play_direction;
use crate::core::writers::write_nearest_csv;

/// Errors raised by the nearest-opponent computation.
#[derive(Error, Debug)]
pub enum ProximityError {
    /// The input violates the record contract (missing player id,
    /// duplicate player in a frame, non-finite coordinate).
    #[error("invalid record in game {game_id} play {play_id} frame {frame_id}: {reason}")]
    InvalidRecord {
        game_id: u64,
        play_id: u32,
        frame_id: u32,
        reason: String,
    },

    #[error("nearest-opponent computation cancelled")]
    Cancelled,
}

impl ProximityError {
    fn invalid(key: FrameKey, reason: String) -> Self {
        ProximityError::InvalidRecord {
            game_id: key.game_id,
            play_id: key.play_id,
            frame_id: key.frame_id,
            reason,
        }
    }
}

/// Result type for proximity operations.
pub type Result<T> = std::result::Result<T, ProximityError>;

/// The nearest opposing player of one player in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestOpponentResult {
    pub game_id: u64,
    pub play_id: u32,
    pub frame_id: u32,
    pub player_id: u32,
    pub nearest_player_id: u32,
    pub nearest_display_name: String,
    pub nearest_x: f64,
    pub nearest_y: f64,
    pub distance: f64,
}

impl NearestOpponentResult {
    #[inline]
    pub fn frame_key(&self) -> FrameKey {
        FrameKey {
            game_id: self.game_id,
            play_id: self.play_id,
            frame_id: self.frame_id,
        }
    }
}

/// Output of [`NearestOpponentComputer::compute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityReport {
    /// One result per player whose frame has at least one opponent, sorted
    /// by `(game_id, play_id, frame_id, player_id)`.
    pub results: Vec<NearestOpponentResult>,
    /// Players skipped because their frame had no opposing player.
    pub skipped_no_opponent: usize,
    /// Number of `(game, play, frame)` groups processed.
    pub groups: usize,
}

/// A group member with its player id already validated.
struct Member<'a> {
    id: u32,
    record: &'a PositionRecord,
}

/// Per-group output, merged into a [`ProximityReport`].
struct GroupOutcome {
    results: Vec<NearestOpponentResult>,
    skipped: usize,
}

/// Computes nearest-opponent distances over a table of positions.
#[derive(Debug, Clone, Default)]
pub struct NearestOpponentComputer {
    config: ProximityConfig,
}

impl NearestOpponentComputer {
    pub fn new(config: ProximityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Compute the nearest opponent of every player in every frame.
    ///
    /// `records` need not be sorted. The result set depends only on the set
    /// of input records, not on their order.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::InvalidRecord`] if a record has no player
    /// id or a non-finite coordinate, or if a player id appears twice in
    /// one frame.
    pub fn compute(&self, records: &[PositionRecord]) -> Result<ProximityReport> {
        let never = AtomicBool::new(false);
        self.compute_with_cancel(records, &never)
    }

    /// Like [`compute`](Self::compute), checking `cancel` before each group.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::Cancelled`] once `cancel` is observed set,
    /// in addition to the errors of [`compute`](Self::compute).
    pub fn compute_with_cancel(
        &self,
        records: &[PositionRecord],
        cancel: &AtomicBool,
    ) -> Result<ProximityReport> {
        let groups = group_by_frame(records);
        let warn_above = self.config.large_group_warning;

        let scan = |(key, members): (&FrameKey, &Vec<&PositionRecord>)| -> Result<GroupOutcome> {
            if cancel.load(Ordering::Relaxed) {
                return Err(ProximityError::Cancelled);
            }
            if members.len() > warn_above {
                log::warn!(
                    "game {} play {} frame {}: {} records in one frame, nearest-opponent scan is quadratic",
                    key.game_id,
                    key.play_id,
                    key.frame_id,
                    members.len()
                );
            }
            nearest_in_group(*key, members)
        };

        let outcomes: Vec<GroupOutcome> = if self.config.parallel {
            groups.par_iter().map(scan).collect::<Result<_>>()?
        } else {
            groups.iter().map(scan).collect::<Result<_>>()?
        };

        let mut report = ProximityReport {
            results: Vec::with_capacity(records.len()),
            skipped_no_opponent: 0,
            groups: outcomes.len(),
        };
        for outcome in outcomes {
            report.skipped_no_opponent += outcome.skipped;
            report.results.extend(outcome.results);
        }
        report
            .results
            .sort_unstable_by_key(|r| (r.frame_key(), r.player_id));

        log::info!(
            "nearest opponent: {} frames, {} results, {} players without an opponent",
            report.groups,
            report.results.len(),
            report.skipped_no_opponent
        );

        Ok(report)
    }
}

fn group_by_frame(records: &[PositionRecord]) -> BTreeMap<FrameKey, Vec<&PositionRecord>> {
    let mut groups: BTreeMap<FrameKey, Vec<&PositionRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.frame_key()).or_default().push(record);
    }
    groups
}

#[inline]
fn squared_distance(a: &PositionRecord, b: &PositionRecord) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Closest opponent and squared distance; ties go to the lowest player id.
fn closest<'a, 'b>(
    player: &Member<'_>,
    opponents: &'b [Member<'a>],
) -> Option<(&'b Member<'a>, f64)> {
    opponents
        .iter()
        .map(|candidate| (candidate, squared_distance(player.record, candidate.record)))
        .min_by(|(a, dist_a), (b, dist_b)| dist_a.total_cmp(dist_b).then(a.id.cmp(&b.id)))
}

fn side_members<'m, 'a>(
    side: TeamSide,
    home: &'m [Member<'a>],
    away: &'m [Member<'a>],
) -> &'m [Member<'a>] {
    match side {
        TeamSide::Home => home,
        TeamSide::Away => away,
    }
}

fn nearest_in_group(key: FrameKey, members: &[&PositionRecord]) -> Result<GroupOutcome> {
    let mut seen = HashSet::with_capacity(members.len());
    let mut home = Vec::with_capacity(members.len());
    let mut away = Vec::with_capacity(members.len());

    for record in members {
        let id = record.player_id.ok_or_else(|| {
            ProximityError::invalid(
                key,
                format!("record '{}' has no player id", record.display_name),
            )
        })?;
        if !record.x.is_finite() || !record.y.is_finite() {
            return Err(ProximityError::invalid(
                key,
                format!("player {} has non-finite position ({}, {})", id, record.x, record.y),
            ));
        }
        if !seen.insert(id) {
            return Err(ProximityError::invalid(
                key,
                format!("player {} appears more than once", id),
            ));
        }

        let member = Member { id, record };
        match record.team_side {
            TeamSide::Home => home.push(member),
            TeamSide::Away => away.push(member),
        }
    }

    let mut outcome = GroupOutcome {
        results: Vec::with_capacity(members.len()),
        skipped: 0,
    };

    for side in [TeamSide::Home, TeamSide::Away] {
        let opponents = side_members(side.opponent(), &home, &away);
        let players = side_members(side, &home, &away);

        if opponents.is_empty() && !players.is_empty() {
            log::debug!(
                "game {} play {} frame {}: {} {} players without an opponent",
                key.game_id,
                key.play_id,
                key.frame_id,
                players.len(),
                side.as_str()
            );
            outcome.skipped += players.len();
            continue;
        }

        for player in players {
            let Some((nearest, dist_sq)) = closest(player, opponents) else {
                continue;
            };
            outcome.results.push(NearestOpponentResult {
                game_id: key.game_id,
                play_id: key.play_id,
                frame_id: key.frame_id,
                player_id: player.id,
                nearest_player_id: nearest.id,
                nearest_display_name: nearest.record.display_name.clone(),
                nearest_x: nearest.record.x,
                nearest_y: nearest.record.y,
                distance: dist_sq.sqrt(),
            });
        }
    }

    Ok(outcome)
}

/// Load a tracking CSV and turn it into player position records.
///
/// Applies play-direction normalization when `ingest.normalize_direction`
/// is set. Club-labelled files need `games` to resolve team sides.
pub fn load_player_positions(
    path: &Path,
    games: Option<&HashMap<u64, GameInfo>>,
    ingest: &IngestConfig,
) -> AnyResult<(Vec<PositionRecord>, IngestStats)> {
    let mut rows = load_tracking_csv(path)
        .with_context(|| format!("failed to load tracking data from {}", path.display()))?;

    if ingest.normalize_direction {
        rows = normalize_play_direction(&rows);
    }

    let (records, stats) = to_position_records(&rows, games)
        .with_context(|| format!("invalid tracking data in {}", path.display()))?;

    log::info!(
        "{}: {} player positions ({} ball/unidentified rows, {} missing coordinates)",
        path.display(),
        stats.players,
        stats.ball_rows,
        stats.missing_coordinates
    );

    Ok((records, stats))
}

/// Process a tracking CSV: load, compute nearest opponents, and save results.
///
/// Results are written to `<stem>_nearest_opponent.csv` in `output_dir`
/// (defaults to the input's directory).
///
/// # Returns
///
/// Tuple of (output CSV path, proximity report).
pub fn process_tracking_csv(
    tracking_path: &Path,
    output_dir: Option<&Path>,
    games: Option<&HashMap<u64, GameInfo>>,
    config: &PipelineConfig,
) -> AnyResult<(PathBuf, ProximityReport)> {
    let (records, _) = load_player_positions(tracking_path, games, &config.ingest)?;

    let computer = NearestOpponentComputer::new(config.proximity.clone());
    let report = computer.compute(&records).with_context(|| {
        format!(
            "nearest-opponent computation failed for {}",
            tracking_path.display()
        )
    })?;

    let out_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => tracking_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };

    let stem = tracking_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tracking");
    let csv_path = out_dir.join(format!("{}_nearest_opponent.csv", stem));

    write_nearest_csv(&csv_path, &report.results)?;
    log::info!("Nearest-opponent CSV -> {}", csv_path.display());

    Ok((csv_path, report))
}
