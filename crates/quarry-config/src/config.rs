//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level world configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World bounds, chunking and generation seed.
    pub world: WorldConfig,
    /// Bounded tick scheduler settings.
    pub ticks: TickConfig,
    /// Block destruction settings.
    pub breaking: BreakingConfig,
    /// Furnace process settings.
    pub furnace: FurnaceConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World volume configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in cells.
    pub size_x: u32,
    /// World height in cells.
    pub size_y: u32,
    /// World depth in cells.
    pub size_z: u32,
    /// Side length of a cubic chunk in cells.
    pub chunk_size: u32,
    /// Terrain generation seed.
    pub seed: u64,
}

/// Periodic tick configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TickConfig {
    /// Seconds between block-behaviour passes.
    pub block_tick_interval: f32,
    /// Half-extent of the block-behaviour box around the reference point.
    pub block_tick_radius: u32,
    /// Seconds between gravity passes (0 = every update).
    pub gravity_interval: f32,
    /// Half-extent of the gravity box around the reference point.
    pub gravity_radius: u32,
}

/// Block destruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BreakingConfig {
    /// Seconds without a hit before accumulated damage is dropped.
    pub reset_window: f32,
    /// Maximum pick distance for break/place targeting, in cells.
    pub reach: f32,
}

/// Furnace process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FurnaceConfig {
    /// Seconds of heating needed to smelt one input unit.
    pub melt_time: f32,
    /// Seconds per presentation phase.
    pub phase_duration: f32,
    /// Seconds between furnace updates.
    pub update_interval: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size_x: 64,
            size_y: 48,
            size_z: 64,
            chunk_size: 16,
            seed: 2742,
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            block_tick_interval: 180.0,
            block_tick_radius: 8,
            gravity_interval: 0.0,
            gravity_radius: 24,
        }
    }
}

impl Default for BreakingConfig {
    fn default() -> Self {
        Self {
            reset_window: 2.0,
            reach: 6.0,
        }
    }
}

impl Default for FurnaceConfig {
    fn default() -> Self {
        Self {
            melt_time: 8.0,
            phase_duration: 2.0,
            update_interval: 0.1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for quarry (e.g. `~/.config/quarry`), if one exists.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quarry"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
