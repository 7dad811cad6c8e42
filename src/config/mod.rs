//! Configuration types for the tracking pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the nearest-opponent computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Compute frame groups on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Group size above which a warning is logged (the scan is quadratic per group)
    #[serde(default = "default_large_group_warning")]
    pub large_group_warning: usize,
}

fn default_parallel() -> bool {
    true
}

fn default_large_group_warning() -> usize {
    64
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            large_group_warning: default_large_group_warning(),
        }
    }
}

/// Configuration for tracking data ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Mirror left-moving plays so offense always moves toward increasing x
    #[serde(default)]
    pub normalize_direction: bool,
}

/// Configuration for frame plots and play animations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Image width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// RGB color of home players
    #[serde(default = "default_home_color")]
    pub home_color: [u8; 3],

    /// RGB color of away players
    #[serde(default = "default_away_color")]
    pub away_color: [u8; 3],

    /// Player marker radius in pixels
    #[serde(default = "default_point_radius")]
    pub point_radius: u32,

    /// Draw a segment from each player to their nearest opponent
    #[serde(default = "default_draw_links")]
    pub draw_links: bool,

    /// Delay between animation frames in milliseconds
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    640
}

fn default_home_color() -> [u8; 3] {
    [214, 39, 40] // red
}

fn default_away_color() -> [u8; 3] {
    [31, 119, 180] // blue
}

fn default_point_radius() -> u32 {
    6
}

fn default_draw_links() -> bool {
    true
}

fn default_frame_delay_ms() -> u32 {
    100
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            home_color: default_home_color(),
            away_color: default_away_color(),
            point_radius: default_point_radius(),
            draw_links: default_draw_links(),
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub proximity: ProximityConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_proximity_config() {
        let config = ProximityConfig::default();
        assert!(config.parallel);
        assert_eq!(config.large_group_warning, 64);
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert!(!config.ingest.normalize_direction);
        assert_eq!(config.plot.width, 1200);
        assert_eq!(config.plot.home_color, [214, 39, 40]);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "proximity:\n  parallel: false\nplot:\n  frame_delay_ms: 40\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(!config.proximity.parallel);
        assert_eq!(config.proximity.large_group_warning, 64);
        assert_eq!(config.plot.frame_delay_ms, 40);
        assert_eq!(config.plot.height, 640);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");

        let mut config = PipelineConfig::default();
        config.ingest.normalize_direction = true;
        config.plot.draw_links = false;
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert!(loaded.ingest.normalize_direction);
        assert!(!loaded.plot.draw_links);
    }
}
