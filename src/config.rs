//! Simulation Configuration
//!
//! Everything tunable about a run, loadable from a RON file. Every field
//! carries a default so a config file only needs to name what it changes,
//! and an absent file means "all defaults".

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::maze::MazeConfig;
use crate::systems::NavTuning;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Edge length of one grid cell in world units.
    pub tile_size: f32,
    /// Level width in tiles.
    pub level_width: usize,
    /// Level height in tiles.
    pub level_height: usize,
    /// How many enemies the runner spawns.
    pub enemy_count: usize,
    pub maze: MazeConfig,
    pub nav: NavTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            level_width: 31,
            level_height: 31,
            enemy_count: 4,
            maze: MazeConfig::default(),
            nav: NavTuning::default(),
        }
    }
}

impl GameConfig {
    /// Load from a RON file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = ron::from_str(&contents)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from a RON file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
