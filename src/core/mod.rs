//! Core data types and I/O operations.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{FrameKey, GameInfo, LoaderError, PlayInfo, PositionRecord, TeamSide, TrackingRow};
pub use transforms::PlaySummary;
pub use writers::{write_nearest_csv, write_play_summary_csv, WriteError};
