//! Data loaders for player-tracking CSV files.
//!
//! This module provides header-driven parsers for the three tables a
//! tracking analysis starts from:
//! - Tracking rows (one row per entity per frame, including the football)
//! - Games (home and visitor club abbreviations per game)
//! - Plays (possession team and pass result per play)
//!
//! Column names are matched case-insensitively. Empty cells and `NA` are
//! treated as missing values.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Which of the two competing sides a player belongs to in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Parse a `home` / `away` label (case-insensitive).
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("home") {
            Some(TeamSide::Home)
        } else if label.eq_ignore_ascii_case("away") {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    /// The other side.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

/// Direction the offense moves during a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayDirection {
    Left,
    Right,
}

impl PlayDirection {
    fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("left") {
            Some(PlayDirection::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Some(PlayDirection::Right)
        } else {
            None
        }
    }
}

/// Identifies one tracking instant: a frame of a play of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameKey {
    pub game_id: u64,
    pub play_id: u32,
    pub frame_id: u32,
}

/// One player's position at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub game_id: u64,
    pub play_id: u32,
    pub frame_id: u32,
    /// `None` for non-player entities; such records are rejected by the
    /// nearest-opponent computation.
    pub player_id: Option<u32>,
    pub display_name: String,
    pub team_side: TeamSide,
    pub x: f64,
    pub y: f64,
}

impl PositionRecord {
    /// Grouping key of this record.
    #[inline]
    pub fn frame_key(&self) -> FrameKey {
        FrameKey {
            game_id: self.game_id,
            play_id: self.play_id,
            frame_id: self.frame_id,
        }
    }
}

/// One raw row of a tracking CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRow {
    pub game_id: u64,
    pub play_id: u32,
    pub frame_id: u32,
    pub player_id: Option<u32>,
    pub display_name: String,
    /// Raw team label: `home`, `away`, `football` or a club abbreviation.
    pub team: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub play_direction: Option<PlayDirection>,
    pub event: Option<String>,
}

impl TrackingRow {
    /// True for the row tracking the ball rather than a player.
    #[inline]
    pub fn is_football(&self) -> bool {
        self.team.trim().eq_ignore_ascii_case("football")
    }
}

/// Game metadata from a games CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_id: u64,
    pub week: Option<u32>,
    pub home_team_abbr: String,
    pub visitor_team_abbr: String,
}

/// Play metadata from a plays CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayInfo {
    pub game_id: u64,
    pub play_id: u32,
    pub possession_team: String,
    pub pass_result: Option<String>,
    pub description: Option<String>,
}

/// Counts collected while turning tracking rows into position records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: usize,
    /// Football rows and rows without a player id.
    pub ball_rows: usize,
    pub missing_coordinates: usize,
    pub players: usize,
}

/// Map lowercase header names to column indices.
fn column_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect()
}

fn require_column(col_map: &HashMap<String, usize>, name: &str) -> Result<usize> {
    col_map
        .get(&name.to_lowercase())
        .copied()
        .ok_or_else(|| LoaderError::MissingColumns(name.to_string()))
}

/// A trimmed, non-missing cell value.
fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    let value = record.get(idx?)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(value)
    }
}

/// Parse an integer id, accepting float-formatted whole numbers like `42403.0`.
fn parse_id<T: TryFrom<u64>>(value: &str) -> Option<T> {
    let raw = value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0 && *v < u64::MAX as f64 && v.fract() == 0.0)
            .map(|v| v as u64)
    })?;
    T::try_from(raw).ok()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn invalid_value(record: &StringRecord, name: &str, value: &str) -> LoaderError {
    LoaderError::ParseError(format!(
        "line {}: invalid {} value: {}",
        line_of(record),
        name,
        value
    ))
}

fn required_id<T: TryFrom<u64>>(record: &StringRecord, idx: usize, name: &str) -> Result<T> {
    let value = cell(record, Some(idx)).ok_or_else(|| {
        LoaderError::ParseError(format!("line {}: missing {}", line_of(record), name))
    })?;
    parse_id(value).ok_or_else(|| invalid_value(record, name, value))
}

/// A cell that may be missing, but must parse when present.
fn optional_parsed<T>(
    record: &StringRecord,
    idx: Option<usize>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    cell(record, idx)
        .map(|value| parse(value).ok_or_else(|| invalid_value(record, name, value)))
        .transpose()
}

fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    value.parse().ok()
}

fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

/// Load tracking rows from a CSV file.
///
/// Required columns: `gameId`, `playId`, `frameId`, `x`, `y` and either
/// `team` (labels `home` / `away` / `football`) or `club` (club
/// abbreviations and `football`). Optional columns: `nflId`,
/// `displayName`, `playDirection`, `event`.
///
/// Rows are returned as read; football rows and missing coordinates are
/// kept so callers can decide how to handle them (see
/// [`to_position_records`]).
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks a required column,
/// contains an unparsable id or coordinate, or has no data rows. Empty and
/// `NA` cells are missing values, not parse errors.
pub fn load_tracking_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrackingRow>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let col_map = column_map(reader.headers()?);

    let game_idx = require_column(&col_map, "gameId")?;
    let play_idx = require_column(&col_map, "playId")?;
    let frame_idx = require_column(&col_map, "frameId")?;
    let x_idx = require_column(&col_map, "x")?;
    let y_idx = require_column(&col_map, "y")?;
    let team_idx = col_map
        .get("team")
        .or_else(|| col_map.get("club"))
        .copied()
        .ok_or_else(|| LoaderError::MissingColumns("team or club".to_string()))?;

    let player_idx = col_map.get("nflid").copied();
    let name_idx = col_map.get("displayname").copied();
    let direction_idx = col_map.get("playdirection").copied();
    let event_idx = col_map.get("event").copied();

    // A single week of tracking data is several million rows
    let mut rows = Vec::with_capacity(65_536);

    for result in reader.records() {
        let record = result?;

        let game_id: u64 = required_id(&record, game_idx, "gameId")?;
        let play_id: u32 = required_id(&record, play_idx, "playId")?;
        let frame_id: u32 = required_id(&record, frame_idx, "frameId")?;

        rows.push(TrackingRow {
            game_id,
            play_id,
            frame_id,
            player_id: optional_parsed(&record, player_idx, "nflId", parse_id::<u32>)?,
            display_name: cell(&record, name_idx).unwrap_or_default().to_string(),
            team: cell(&record, Some(team_idx)).unwrap_or_default().to_string(),
            x: optional_parsed(&record, Some(x_idx), "x", parse_number::<f64>)?,
            y: optional_parsed(&record, Some(y_idx), "y", parse_number::<f64>)?,
            play_direction: cell(&record, direction_idx).and_then(PlayDirection::parse_label),
            event: cell(&record, event_idx).map(str::to_string),
        });
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    log::debug!("{}: read {} tracking rows", path.display(), rows.len());

    Ok(rows)
}

/// Load game metadata keyed by game id.
///
/// Required columns: `gameId`, `homeTeamAbbr`, `visitorTeamAbbr`.
/// Optional: `week`.
pub fn load_games_csv<P: AsRef<Path>>(path: P) -> Result<HashMap<u64, GameInfo>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let col_map = column_map(reader.headers()?);
    let game_idx = require_column(&col_map, "gameId")?;
    let home_idx = require_column(&col_map, "homeTeamAbbr")?;
    let visitor_idx = require_column(&col_map, "visitorTeamAbbr")?;
    let week_idx = col_map.get("week").copied();

    let mut games = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let game_id: u64 = required_id(&record, game_idx, "gameId")?;

        games.insert(
            game_id,
            GameInfo {
                game_id,
                week: optional_parsed(&record, week_idx, "week", parse_id::<u32>)?,
                home_team_abbr: cell(&record, Some(home_idx)).unwrap_or_default().to_string(),
                visitor_team_abbr: cell(&record, Some(visitor_idx))
                    .unwrap_or_default()
                    .to_string(),
            },
        );
    }

    if games.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(games)
}

/// Load play metadata.
///
/// Required columns: `gameId`, `playId`, `possessionTeam`.
/// Optional: `passResult`, `playDescription`.
pub fn load_plays_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PlayInfo>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let col_map = column_map(reader.headers()?);
    let game_idx = require_column(&col_map, "gameId")?;
    let play_idx = require_column(&col_map, "playId")?;
    let possession_idx = require_column(&col_map, "possessionTeam")?;
    let pass_result_idx = col_map.get("passresult").copied();
    let description_idx = col_map.get("playdescription").copied();

    let mut plays = Vec::new();

    for result in reader.records() {
        let record = result?;

        plays.push(PlayInfo {
            game_id: required_id(&record, game_idx, "gameId")?,
            play_id: required_id(&record, play_idx, "playId")?,
            possession_team: cell(&record, Some(possession_idx))
                .unwrap_or_default()
                .to_string(),
            pass_result: cell(&record, pass_result_idx).map(str::to_string),
            description: cell(&record, description_idx).map(str::to_string),
        });
    }

    if plays.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(plays)
}

/// Resolve the side of a player row from its team label.
///
/// `home` / `away` labels map directly. Club abbreviations are matched
/// against the game's home and visitor clubs; a third club in a game is
/// rejected.
fn resolve_side(row: &TrackingRow, games: Option<&HashMap<u64, GameInfo>>) -> Result<TeamSide> {
    if let Some(side) = TeamSide::parse_label(&row.team) {
        return Ok(side);
    }

    let game = games.and_then(|g| g.get(&row.game_id)).ok_or_else(|| {
        LoaderError::InvalidRecord(format!(
            "game {} play {} frame {}: team '{}' is not home/away and no game info is available",
            row.game_id, row.play_id, row.frame_id, row.team
        ))
    })?;

    let club = row.team.trim();
    if club.eq_ignore_ascii_case(&game.home_team_abbr) {
        Ok(TeamSide::Home)
    } else if club.eq_ignore_ascii_case(&game.visitor_team_abbr) {
        Ok(TeamSide::Away)
    } else {
        Err(LoaderError::InvalidRecord(format!(
            "game {} play {} frame {}: club '{}' is neither home '{}' nor visitor '{}'",
            row.game_id,
            row.play_id,
            row.frame_id,
            club,
            game.home_team_abbr,
            game.visitor_team_abbr
        )))
    }
}

/// Convert raw tracking rows into player position records.
///
/// Football rows and rows without a player id are dropped, as are rows
/// with a missing coordinate. Team sides are resolved from the team label,
/// using `games` for club abbreviations.
///
/// # Errors
///
/// Returns [`LoaderError::InvalidRecord`] if a team label cannot be
/// resolved to a side of its game.
pub fn to_position_records(
    rows: &[TrackingRow],
    games: Option<&HashMap<u64, GameInfo>>,
) -> Result<(Vec<PositionRecord>, IngestStats)> {
    let mut stats = IngestStats::default();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        stats.rows_read += 1;

        let player_id = match row.player_id {
            Some(id) if !row.is_football() => id,
            _ => {
                stats.ball_rows += 1;
                continue;
            }
        };

        let (x, y) = match (row.x, row.y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                stats.missing_coordinates += 1;
                continue;
            }
        };

        records.push(PositionRecord {
            game_id: row.game_id,
            play_id: row.play_id,
            frame_id: row.frame_id,
            player_id: Some(player_id),
            display_name: row.display_name.clone(),
            team_side: resolve_side(row, games)?,
            x,
            y,
        });
    }

    stats.players = records.len();

    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn games_fixture() -> HashMap<u64, GameInfo> {
        let mut games = HashMap::new();
        games.insert(
            2022090800,
            GameInfo {
                game_id: 2022090800,
                week: Some(1),
                home_team_abbr: "LA".to_string(),
                visitor_team_abbr: "BUF".to_string(),
            },
        );
        games
    }

    #[test]
    fn test_team_side_labels() {
        assert_eq!(TeamSide::parse_label("home"), Some(TeamSide::Home));
        assert_eq!(TeamSide::parse_label(" AWAY "), Some(TeamSide::Away));
        assert_eq!(TeamSide::parse_label("football"), None);
        assert_eq!(TeamSide::Home.opponent(), TeamSide::Away);
        assert_eq!(TeamSide::Away.as_str(), "away");
    }

    #[test]
    fn test_load_tracking_csv() -> Result<()> {
        let file = write_csv(&[
            "time,x,y,s,nflId,displayName,jerseyNumber,frameId,team,gameId,playId,playDirection,event",
            "2018-09-07T01:07:14.599Z,91.73,26.67,0,310,Matt Ryan,2,1,away,2018090600,75,left,None",
            "2018-09-07T01:07:14.599Z,88.89,36.47,0.01,79848,Malcolm Jenkins,27,1,home,2018090600,75,left,NA",
            "2018-09-07T01:07:14.599Z,88.89,26.50,0,NA,Football,NA,1,football,2018090600,75,left,NA",
        ]);

        let rows = load_tracking_csv(file.path())?;
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].game_id, 2018090600);
        assert_eq!(rows[0].play_id, 75);
        assert_eq!(rows[0].frame_id, 1);
        assert_eq!(rows[0].player_id, Some(310));
        assert_eq!(rows[0].display_name, "Matt Ryan");
        assert_eq!(rows[0].x, Some(91.73));
        assert_eq!(rows[0].play_direction, Some(PlayDirection::Left));
        assert_eq!(rows[0].event.as_deref(), Some("None"));

        assert_eq!(rows[1].event, None);
        assert!(rows[2].is_football());
        assert_eq!(rows[2].player_id, None);

        Ok(())
    }

    #[test]
    fn test_load_tracking_csv_club_column_and_float_ids() -> Result<()> {
        let file = write_csv(&[
            "gameId,playId,nflId,displayName,frameId,club,x,y",
            "2022090800,56,35472.0,Rodger Saffold,1,BUF,88.37,27.27",
            "2022090800,56,,football,1,football,88.3,29.0",
        ]);

        let rows = load_tracking_csv(file.path())?;
        assert_eq!(rows[0].player_id, Some(35472));
        assert_eq!(rows[0].team, "BUF");
        assert_eq!(rows[0].play_direction, None);
        assert_eq!(rows[1].player_id, None);

        Ok(())
    }

    #[test]
    fn test_load_tracking_csv_missing_columns() {
        let file = write_csv(&["gameId,playId,frameId,x,y", "1,1,1,0.0,0.0"]);

        match load_tracking_csv(file.path()) {
            Err(LoaderError::MissingColumns(name)) => assert_eq!(name, "team or club"),
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_load_tracking_csv_bad_id() {
        let file = write_csv(&["gameId,playId,frameId,team,x,y", "1,abc,1,home,0.0,0.0"]);

        let err = load_tracking_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseError(_)));
        assert!(err.to_string().contains("playId"));
    }

    #[test]
    fn test_load_tracking_csv_bad_player_id() {
        let file = write_csv(&[
            "gameId,playId,nflId,displayName,frameId,team,x,y",
            "1,1,7,Ok,1,away,3.0,2.0",
            "1,1,12x4,Typo,1,home,1.0,2.0",
        ]);

        let err = load_tracking_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseError(_)));
        let message = err.to_string();
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("nflId"), "{}", message);
        assert!(message.contains("12x4"), "{}", message);
    }

    #[test]
    fn test_load_tracking_csv_bad_coordinate() {
        let file = write_csv(&[
            "gameId,playId,nflId,displayName,frameId,team,x,y",
            "1,1,5,BadX,1,away,abc,2.0",
        ]);

        let err = load_tracking_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseError(_)));
        assert!(err.to_string().contains("invalid x value: abc"));
    }

    #[test]
    fn test_load_tracking_csv_out_of_range_id() {
        let file = write_csv(&[
            "gameId,playId,nflId,displayName,frameId,team,x,y",
            "1e30,1,6,Huge,1,away,3.0,2.0",
        ]);

        let err = load_tracking_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseError(_)));
        assert!(err.to_string().contains("gameId"));
    }

    #[test]
    fn test_parse_id_range() {
        assert_eq!(parse_id::<u64>("42403.0"), Some(42403));
        assert_eq!(parse_id::<u64>("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_id::<u64>("1e30"), None);
        assert_eq!(parse_id::<u64>("18446744073709551616.0"), None);
        assert_eq!(parse_id::<u32>("4294967296"), None);
        assert_eq!(parse_id::<u32>("-1"), None);
        assert_eq!(parse_id::<u32>("1.5"), None);
        assert_eq!(parse_id::<u32>("inf"), None);
    }

    #[test]
    fn test_load_tracking_csv_na_cells_are_missing() -> Result<()> {
        let file = write_csv(&[
            "gameId,playId,nflId,displayName,frameId,team,x,y",
            "1,1,NA,football,1,football,NA,",
        ]);

        let rows = load_tracking_csv(file.path())?;
        assert_eq!(rows[0].player_id, None);
        assert_eq!(rows[0].x, None);
        assert_eq!(rows[0].y, None);

        Ok(())
    }

    #[test]
    fn test_load_tracking_csv_empty() {
        let file = write_csv(&["gameId,playId,frameId,team,x,y"]);

        assert!(matches!(
            load_tracking_csv(file.path()),
            Err(LoaderError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_load_games_csv() -> Result<()> {
        let file = write_csv(&[
            "gameId,season,week,gameDate,homeTeamAbbr,visitorTeamAbbr",
            "2022090800,2022,1,09/08/2022,LA,BUF",
            "2022091100,2022,1,09/11/2022,ATL,NO",
        ]);

        let games = load_games_csv(file.path())?;
        assert_eq!(games.len(), 2);
        let game = &games[&2022090800];
        assert_eq!(game.week, Some(1));
        assert_eq!(game.home_team_abbr, "LA");
        assert_eq!(game.visitor_team_abbr, "BUF");

        Ok(())
    }

    #[test]
    fn test_load_plays_csv() -> Result<()> {
        let file = write_csv(&[
            "gameId,playId,playDescription,possessionTeam,passResult",
            "2022090800,56,\"(15:00) J.Allen pass short right\",BUF,C",
            "2022090800,80,\"(14:20) D.Singletary up the middle\",BUF,",
        ]);

        let plays = load_plays_csv(file.path())?;
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].possession_team, "BUF");
        assert_eq!(plays[0].pass_result.as_deref(), Some("C"));
        assert!(plays[0].description.as_deref().unwrap().contains("J.Allen"));
        assert_eq!(plays[1].pass_result, None);

        Ok(())
    }

    fn row(player_id: Option<u32>, team: &str, x: Option<f64>) -> TrackingRow {
        TrackingRow {
            game_id: 2022090800,
            play_id: 56,
            frame_id: 1,
            player_id,
            display_name: "Player".to_string(),
            team: team.to_string(),
            x,
            y: Some(20.0),
            play_direction: None,
            event: None,
        }
    }

    #[test]
    fn test_to_position_records_filters_rows() -> Result<()> {
        let rows = vec![
            row(Some(1), "home", Some(10.0)),
            row(Some(2), "away", Some(12.0)),
            row(None, "football", Some(11.0)),
            row(Some(3), "away", None),
        ];

        let (records, stats) = to_position_records(&rows, None)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].team_side, TeamSide::Home);
        assert_eq!(records[1].team_side, TeamSide::Away);
        assert_eq!(
            stats,
            IngestStats {
                rows_read: 4,
                ball_rows: 1,
                missing_coordinates: 1,
                players: 2,
            }
        );

        Ok(())
    }

    #[test]
    fn test_to_position_records_resolves_clubs() -> Result<()> {
        let games = games_fixture();
        let rows = vec![row(Some(1), "LA", Some(10.0)), row(Some(2), "buf", Some(12.0))];

        let (records, _) = to_position_records(&rows, Some(&games))?;
        assert_eq!(records[0].team_side, TeamSide::Home);
        assert_eq!(records[1].team_side, TeamSide::Away);

        Ok(())
    }

    #[test]
    fn test_to_position_records_rejects_third_club() {
        let games = games_fixture();
        let rows = vec![
            row(Some(1), "LA", Some(10.0)),
            row(Some(2), "BUF", Some(12.0)),
            row(Some(3), "KC", Some(14.0)),
        ];

        let err = to_position_records(&rows, Some(&games)).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidRecord(_)));
        assert!(err.to_string().contains("KC"));
    }

    #[test]
    fn test_to_position_records_club_without_games() {
        let rows = vec![row(Some(1), "LA", Some(10.0))];

        assert!(matches!(
            to_position_records(&rows, None),
            Err(LoaderError::InvalidRecord(_))
        ));
    }
}
