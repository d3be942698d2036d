use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::grid::DEFAULT_ROW_HEIGHT;

#[derive(Parser)]
pub struct Cli {
    #[arg(long)]
    pub data: Option<String>,
    #[arg(long)]
    pub row_height: Option<u16>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub reset: bool,
}

/// Settings persisted between runs. Flags given on the command line override
/// these and are written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedConfig {
    pub data_path: Option<String>,
    pub row_height: u16,
}

impl Default for SavedConfig {
    fn default() -> Self {
        SavedConfig {
            data_path: None,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sparkgrid").join("config.json"))
}

pub fn load_config() -> Option<SavedConfig> {
    let path = config_path()?;
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn save_config(config: &SavedConfig) -> Result<(), io::Error> {
    let path = config_path().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "no configuration directory available",
        )
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, contents)
}

/// Removes the saved configuration. Returns whether there was one.
pub fn reset_config() -> Result<bool, io::Error> {
    let path = match config_path() {
        Some(path) => path,
        None => return Ok(false),
    };
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_config_round_trips_through_json() {
        let config = SavedConfig {
            data_path: Some("prices/cmo.csv".to_string()),
            row_height: 4,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SavedConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data_path.as_deref(), Some("prices/cmo.csv"));
        assert_eq!(back.row_height, 4);
    }

    #[test]
    fn default_matches_grid_row_height() {
        assert_eq!(SavedConfig::default().row_height, DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn stale_config_shapes_are_rejected_not_panicked() {
        assert!(serde_json::from_str::<SavedConfig>("{\"rows\": 3}").is_err());
    }
}
