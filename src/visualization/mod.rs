//! Frame plots and play animations.
//!
//! This module draws player positions on a football field using the plotters
//! library: a single frame as PNG, or every frame of a play as an animated
//! GIF. Each player can be linked to their nearest opponent.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::core::loaders::{FrameKey, PositionRecord, TeamSide};
use crate::core::transforms::{FIELD_LENGTH, FIELD_WIDTH};
use crate::processors::proximity::NearestOpponentResult;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("No player positions for game {game_id} play {play_id} frame {frame_id}")]
    EmptyFrame {
        game_id: u64,
        play_id: u32,
        frame_id: u32,
    },

    #[error("No player positions for game {game_id} play {play_id}")]
    EmptyPlay { game_id: u64, play_id: u32 },
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Turf background.
const FIELD_COLOR: RGBColor = RGBColor(58, 125, 68);

/// Nearest-opponent link color.
const LINK_COLOR: RGBColor = RGBColor(240, 240, 160);

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

fn side_color(side: TeamSide, config: &PlotConfig) -> RGBColor {
    let [r, g, b] = match side {
        TeamSide::Home => config.home_color,
        TeamSide::Away => config.away_color,
    };
    RGBColor(r, g, b)
}

/// Draw one frame onto `root`: field, yard lines, links, then players.
fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    players: &[&PositionRecord],
    results: &[&NearestOpponentResult],
    config: &PlotConfig,
) -> Result<()> {
    root.fill(&FIELD_COLOR).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .build_cartesian_2d(0.0..FIELD_LENGTH, 0.0..FIELD_WIDTH)
        .map_err(plot_err)?;

    // Yard lines every 10 yards; goal lines (10 and 110) are thicker
    chart
        .draw_series((1..12).map(|i| {
            let x = i as f64 * 10.0;
            let width = if i == 1 || i == 11 { 3 } else { 1 };
            PathElement::new(vec![(x, 0.0), (x, FIELD_WIDTH)], WHITE.stroke_width(width))
        }))
        .map_err(plot_err)?;

    if config.draw_links {
        let positions: HashMap<u32, (f64, f64)> = players
            .iter()
            .filter_map(|p| p.player_id.map(|id| (id, (p.x, p.y))))
            .collect();

        chart
            .draw_series(results.iter().filter_map(|r| {
                let from = *positions.get(&r.player_id)?;
                Some(PathElement::new(
                    vec![from, (r.nearest_x, r.nearest_y)],
                    LINK_COLOR.stroke_width(1),
                ))
            }))
            .map_err(plot_err)?;
    }

    chart
        .draw_series(players.iter().map(|p| {
            Circle::new(
                (p.x, p.y),
                config.point_radius,
                side_color(p.team_side, config).filled(),
            )
        }))
        .map_err(plot_err)?;

    Ok(())
}

/// Plot one frame of tracking data and save it as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `records` - Position records (only those matching `key` are drawn)
/// * `results` - Nearest-opponent results (only those matching `key` are drawn)
/// * `key` - The frame to draw
/// * `config` - Image size, colors and link drawing
pub fn plot_frame(
    output_path: &Path,
    records: &[PositionRecord],
    results: &[NearestOpponentResult],
    key: FrameKey,
    config: &PlotConfig,
) -> Result<()> {
    let players: Vec<&PositionRecord> = records.iter().filter(|r| r.frame_key() == key).collect();
    if players.is_empty() {
        return Err(VisualizationError::EmptyFrame {
            game_id: key.game_id,
            play_id: key.play_id,
            frame_id: key.frame_id,
        });
    }
    let links: Vec<&NearestOpponentResult> =
        results.iter().filter(|r| r.frame_key() == key).collect();

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    draw_frame(&root, &players, &links, config)?;
    root.present().map_err(plot_err)?;

    Ok(())
}

/// Render every frame of a play as an animated GIF.
///
/// Frames are drawn in frame-id order with `config.frame_delay_ms` between
/// them.
///
/// # Returns
///
/// The number of frames written.
pub fn animate_play(
    output_path: &Path,
    records: &[PositionRecord],
    results: &[NearestOpponentResult],
    game_id: u64,
    play_id: u32,
    config: &PlotConfig,
) -> Result<usize> {
    let in_play = |g: u64, p: u32| g == game_id && p == play_id;

    let mut frames: BTreeMap<u32, Vec<&PositionRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| in_play(r.game_id, r.play_id)) {
        frames.entry(record.frame_id).or_default().push(record);
    }
    if frames.is_empty() {
        return Err(VisualizationError::EmptyPlay { game_id, play_id });
    }

    let mut links: HashMap<u32, Vec<&NearestOpponentResult>> = HashMap::new();
    for result in results.iter().filter(|r| in_play(r.game_id, r.play_id)) {
        links.entry(result.frame_id).or_default().push(result);
    }

    let size = (config.width, config.height);
    let root = BitMapBackend::gif(output_path, size, config.frame_delay_ms)
        .map_err(plot_err)?
        .into_drawing_area();

    for (frame_id, players) in &frames {
        let frame_links = links.get(frame_id).map(Vec::as_slice).unwrap_or(&[]);
        draw_frame(&root, players, frame_links, config)?;
        root.present().map_err(plot_err)?;
    }

    log::info!(
        "game {} play {}: animated {} frames -> {}",
        game_id,
        play_id,
        frames.len(),
        output_path.display()
    );

    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_config() -> PlotConfig {
        PlotConfig {
            width: 240,
            height: 120,
            ..PlotConfig::default()
        }
    }

    fn records() -> Vec<PositionRecord> {
        let mut records = Vec::new();
        for frame_id in 1..=3u32 {
            for (id, side, x) in [(1u32, TeamSide::Home, 40.0), (2, TeamSide::Away, 45.0)] {
                records.push(PositionRecord {
                    game_id: 1,
                    play_id: 1,
                    frame_id,
                    player_id: Some(id),
                    display_name: format!("P{}", id),
                    team_side: side,
                    x: x + frame_id as f64,
                    y: 20.0,
                });
            }
        }
        records
    }

    fn key(frame_id: u32) -> FrameKey {
        FrameKey {
            game_id: 1,
            play_id: 1,
            frame_id,
        }
    }

    #[test]
    fn test_plot_frame_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let records = records();
        let results = crate::processors::proximity::NearestOpponentComputer::default()
            .compute(&records)
            .unwrap()
            .results;

        plot_frame(&path, &records, &results, key(2), &small_config()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_plot_frame_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let err = plot_frame(&path, &records(), &[], key(99), &small_config()).unwrap_err();
        assert!(matches!(
            err,
            VisualizationError::EmptyFrame {
                game_id: 1,
                play_id: 1,
                frame_id: 99
            }
        ));
        assert!(err.to_string().contains("frame 99"));
        assert!(!path.exists());
    }

    #[test]
    fn test_animate_play_writes_gif() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("play.gif");

        let frames = animate_play(&path, &records(), &[], 1, 1, &small_config()).unwrap();
        assert_eq!(frames, 3);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF"));
    }

    #[test]
    fn test_animate_unknown_play() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("play.gif");

        let result = animate_play(&path, &records(), &[], 1, 2, &small_config());
        assert!(matches!(
            result,
            Err(VisualizationError::EmptyPlay {
                game_id: 1,
                play_id: 2
            })
        ));
    }
}
