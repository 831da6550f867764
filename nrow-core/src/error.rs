//! Error types for the game core

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the game core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid board dimension {dim} (supported: 3 or 4)")]
    InvalidDimension { dim: usize },

    #[error("cell {cell} is out of range (board has {cells} cells)")]
    CellOutOfRange { cell: usize, cells: usize },

    #[error("cell {cell} is already occupied")]
    CellOccupied { cell: usize },

    #[error("game already over")]
    GameOver,

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimension_display() {
        let err = Error::InvalidDimension { dim: 7 };
        assert_eq!(err.to_string(), "invalid board dimension 7 (supported: 3 or 4)");
    }

    #[test]
    fn test_cell_errors_display() {
        assert_eq!(
            Error::CellOutOfRange { cell: 9, cells: 9 }.to_string(),
            "cell 9 is out of range (board has 9 cells)"
        );
        assert_eq!(
            Error::CellOccupied { cell: 4 }.to_string(),
            "cell 4 is already occupied"
        );
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::ConfigValidation("time_allowed_secs must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: time_allowed_secs must be > 0"
        );
    }
}
