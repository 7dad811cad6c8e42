//! Data processing modules.

pub mod discovery;
pub mod proximity;

// Re-export key types for convenience
pub use discovery::{find_tracking_files, week_from_path, DiscoveryError};
pub use proximity::{
    load_player_positions, process_tracking_csv, NearestOpponentComputer, NearestOpponentResult,
    ProximityError, ProximityReport,
};
