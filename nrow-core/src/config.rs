//! Game configuration, loadable from TOML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Dim, Error, Result};

/// Default time allowance per player, in seconds.
pub const TIME_ALLOWED_SECS: f64 = 100.0;
/// Default board dimension.
pub const BOARD_DIM: usize = 3;

/// Settings chosen before a game starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Total thinking time each player may use
    pub time_allowed_secs: f64,

    /// Board side length (3 or 4)
    pub board_dim: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_allowed_secs: TIME_ALLOWED_SECS,
            board_dim: BOARD_DIM,
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GameConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Write configuration as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.time_allowed_secs.is_finite() || self.time_allowed_secs <= 0.0 {
            return Err(Error::ConfigValidation(
                "time_allowed_secs must be a positive number".into(),
            ));
        }
        Dim::new(self.board_dim)?;
        Ok(())
    }

    /// Time allowance as a Duration.
    pub fn time_allowed(&self) -> Duration {
        Duration::from_secs_f64(self.time_allowed_secs)
    }
}
