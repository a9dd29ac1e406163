//! Game configuration, read from a RON file.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use crate::capture::Inventory;
use crate::errors::{ConfigError, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pokedex-battle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub trainer: String,
    /// RON dex file backing the data service
    pub data_file: PathBuf,
    /// Where sessions are saved. Falls back to the platform config directory.
    pub save_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible battles
    pub seed: Option<u64>,
    pub log_level: String,
    /// Inventory a brand new trainer starts with
    pub starting_inventory: Inventory,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            trainer: "trainer".to_string(),
            data_file: PathBuf::from("data/dex.ron"),
            save_dir: None,
            seed: None,
            log_level: "warn".to_string(),
            starting_inventory: Inventory {
                poke_balls: 10,
                great_balls: 3,
                ultra_balls: 1,
                potions: 3,
            },
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Read the file at `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_ron_str(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_dir(&self) -> Result<PathBuf, StoreError> {
        match &self.save_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs_next::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(StoreError::NoSaveLocation),
        }
    }

    /// Default location of the config file itself.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join(APP_DIR).join("config.ron"))
    }
}
