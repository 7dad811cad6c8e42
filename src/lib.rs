//! Nearest-opponent analysis for American football player-tracking data.
//!
//! This crate provides tools for:
//! - Loading tracking, games and plays CSV files
//! - Resolving players to home/away sides and normalizing play direction
//! - Computing each player's nearest opponent per frame (parallelized)
//! - Writing results and per-play summaries, and plotting frames and plays
//!
//! # Example
//!
//! ```no_run
//! use gridiron_tracking::core::loaders::{load_tracking_csv, to_position_records};
//! use gridiron_tracking::NearestOpponentComputer;
//!
//! let rows = load_tracking_csv("tracking_week_1.csv").unwrap();
//! let (records, _stats) = to_position_records(&rows, None).unwrap();
//! let report = NearestOpponentComputer::default().compute(&records).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{IngestConfig, PipelineConfig, PlotConfig, ProximityConfig};
pub use core::loaders::{FrameKey, PositionRecord, TeamSide};
pub use processors::proximity::{
    NearestOpponentComputer, NearestOpponentResult, ProximityError, ProximityReport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
