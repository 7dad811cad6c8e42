//! Field-coordinate transforms and per-play aggregation.
//!
//! This module provides the operations applied around the nearest-opponent
//! computation: mirroring plays into a common direction, slicing a single
//! play out of a tracking table, and summarizing distances per play.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::loaders::{PlayDirection, PlayInfo, PositionRecord, TrackingRow};
use crate::processors::proximity::NearestOpponentResult;

/// Field length in yards, end line to end line.
pub const FIELD_LENGTH: f64 = 120.0;

/// Field width in yards (160 feet).
pub const FIELD_WIDTH: f64 = 160.0 / 3.0;

/// Mirror left-moving plays so the offense always moves toward increasing x.
///
/// Rows with `play_direction == Left` get `x -> FIELD_LENGTH - x` and
/// `y -> FIELD_WIDTH - y` (120 and 160/3 yards); all other rows are copied
/// unchanged.
///
/// # Example
///
/// ```ignore
/// let rows = load_tracking_csv("tracking_week_1.csv")?;
/// let rows = normalize_play_direction(&rows);
/// ```
pub fn normalize_play_direction(rows: &[TrackingRow]) -> Vec<TrackingRow> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            if row.play_direction == Some(PlayDirection::Left) {
                row.x = row.x.map(|x| FIELD_LENGTH - x);
                row.y = row.y.map(|y| FIELD_WIDTH - y);
                row.play_direction = Some(PlayDirection::Right);
            }
            row
        })
        .collect()
}

/// Records belonging to one play of one game.
pub fn select_play(records: &[PositionRecord], game_id: u64, play_id: u32) -> Vec<PositionRecord> {
    records
        .iter()
        .filter(|r| r.game_id == game_id && r.play_id == play_id)
        .cloned()
        .collect()
}

/// Sorted, distinct frame ids present in `records`.
pub fn frame_ids(records: &[PositionRecord]) -> Vec<u32> {
    records
        .iter()
        .map(|r| r.frame_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Nearest-opponent distance statistics for one play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub game_id: u64,
    pub play_id: u32,
    /// Frames with at least one result.
    pub frames: usize,
    /// Number of player-frame results.
    pub results: usize,
    pub mean_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub possession_team: Option<String>,
    pub pass_result: Option<String>,
}

/// Aggregate nearest-opponent results per `(game, play)`.
///
/// Each summary is joined with the matching entry of `plays` (possession
/// team, pass result) when there is one. Summaries are ordered by
/// `(game_id, play_id)`.
pub fn summarize_by_play(
    results: &[NearestOpponentResult],
    plays: &[PlayInfo],
) -> Vec<PlaySummary> {
    let play_index: HashMap<(u64, u32), &PlayInfo> =
        plays.iter().map(|p| ((p.game_id, p.play_id), p)).collect();

    let mut by_play: BTreeMap<(u64, u32), Vec<&NearestOpponentResult>> = BTreeMap::new();
    for result in results {
        by_play
            .entry((result.game_id, result.play_id))
            .or_default()
            .push(result);
    }

    by_play
        .into_iter()
        .map(|((game_id, play_id), play_results)| {
            let frames: BTreeSet<u32> = play_results.iter().map(|r| r.frame_id).collect();

            let mut sum = 0.0;
            let mut min_distance = f64::MAX;
            let mut max_distance = f64::MIN;
            for r in &play_results {
                sum += r.distance;
                min_distance = min_distance.min(r.distance);
                max_distance = max_distance.max(r.distance);
            }

            let info = play_index.get(&(game_id, play_id));

            PlaySummary {
                game_id,
                play_id,
                frames: frames.len(),
                results: play_results.len(),
                mean_distance: sum / play_results.len() as f64,
                min_distance,
                max_distance,
                possession_team: info.map(|p| p.possession_team.clone()),
                pass_result: info.and_then(|p| p.pass_result.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::TeamSide;

    fn tracking_row(direction: Option<PlayDirection>, x: f64, y: f64) -> TrackingRow {
        TrackingRow {
            game_id: 1,
            play_id: 1,
            frame_id: 1,
            player_id: Some(10),
            display_name: "Runner".to_string(),
            team: "home".to_string(),
            x: Some(x),
            y: Some(y),
            play_direction: direction,
            event: None,
        }
    }

    fn result(play_id: u32, frame_id: u32, player_id: u32, distance: f64) -> NearestOpponentResult {
        NearestOpponentResult {
            game_id: 1,
            play_id,
            frame_id,
            player_id,
            nearest_player_id: 99,
            nearest_display_name: "Defender".to_string(),
            nearest_x: 0.0,
            nearest_y: 0.0,
            distance,
        }
    }

    #[test]
    fn test_normalize_play_direction() {
        let rows = vec![
            tracking_row(Some(PlayDirection::Left), 30.0, 10.0),
            tracking_row(Some(PlayDirection::Right), 30.0, 10.0),
            tracking_row(None, 30.0, 10.0),
        ];

        let normalized = normalize_play_direction(&rows);

        assert_eq!(normalized[0].x, Some(90.0));
        assert!((normalized[0].y.unwrap() - (FIELD_WIDTH - 10.0)).abs() < 1e-12);
        assert_eq!(normalized[0].play_direction, Some(PlayDirection::Right));

        assert_eq!(normalized[1], rows[1]);
        assert_eq!(normalized[2], rows[2]);
    }

    #[test]
    fn test_normalize_keeps_missing_coordinates() {
        let mut row = tracking_row(Some(PlayDirection::Left), 30.0, 10.0);
        row.x = None;

        let normalized = normalize_play_direction(&[row]);
        assert_eq!(normalized[0].x, None);
    }

    #[test]
    fn test_select_play_and_frame_ids() {
        let make = |play_id: u32, frame_id: u32| PositionRecord {
            game_id: 1,
            play_id,
            frame_id,
            player_id: Some(frame_id),
            display_name: String::new(),
            team_side: TeamSide::Home,
            x: 0.0,
            y: 0.0,
        };
        let records = vec![make(1, 3), make(2, 1), make(1, 1), make(1, 3)];

        let play = select_play(&records, 1, 1);
        assert_eq!(play.len(), 3);
        assert_eq!(frame_ids(&play), vec![1, 3]);
        assert!(select_play(&records, 2, 1).is_empty());
    }

    #[test]
    fn test_summarize_by_play() {
        let results = vec![
            result(1, 1, 10, 2.0),
            result(1, 1, 11, 4.0),
            result(1, 2, 10, 6.0),
            result(2, 1, 10, 1.5),
        ];
        let plays = vec![PlayInfo {
            game_id: 1,
            play_id: 1,
            possession_team: "BUF".to_string(),
            pass_result: Some("C".to_string()),
            description: None,
        }];

        let summaries = summarize_by_play(&results, &plays);
        assert_eq!(summaries.len(), 2);

        let first = &summaries[0];
        assert_eq!((first.game_id, first.play_id), (1, 1));
        assert_eq!(first.frames, 2);
        assert_eq!(first.results, 3);
        assert_eq!(first.mean_distance, 4.0);
        assert_eq!(first.min_distance, 2.0);
        assert_eq!(first.max_distance, 6.0);
        assert_eq!(first.possession_team.as_deref(), Some("BUF"));
        assert_eq!(first.pass_result.as_deref(), Some("C"));

        let second = &summaries[1];
        assert_eq!(second.play_id, 2);
        assert_eq!(second.mean_distance, 1.5);
        assert_eq!(second.possession_team, None);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize_by_play(&[], &[]).is_empty());
    }
}
