//! Board configuration.
//!
//! Read from `config.toml` in the user config directory
//! (`~/.config/weekboard/config.toml` on Linux). `WEEKBOARD_CONFIG` points at
//! another file. Every field has a default, so a missing file is fine.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::week::{parse_utc_offset, FirstDay, WeekPolicy};

const APP_DIR: &str = "weekboard";
const CONFIG_FILE: &str = "config.toml";
const DB_FILE: &str = "board.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Day that opens a week: sunday or monday
    #[serde(default)]
    pub first_day_of_week: FirstDay,

    /// Offset all dates are computed in, `+HH:MM` / `-HH:MM`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Database file; `WEEKBOARD_DB` takes precedence
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_day_of_week: FirstDay::default(),
            utc_offset: default_utc_offset(),
            database: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Location of the config file.
    pub fn path() -> PathBuf {
        std::env::var("WEEKBOARD_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push(APP_DIR);
            p.push(CONFIG_FILE);
            p
        })
    }

    /// Loads the config file at [`Config::path`], or defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path())
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        config.policy().map_err(|e| Error::Config {
            path,
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// The calendar policy every computation runs under.
    pub fn policy(&self) -> Result<WeekPolicy> {
        let offset = parse_utc_offset(&self.utc_offset).ok_or_else(|| Error::Config {
            path: Self::path(),
            reason: format!("invalid utc_offset '{}', expected +HH:MM", self.utc_offset),
        })?;
        Ok(WeekPolicy::new(self.first_day_of_week, offset))
    }

    /// Database location: `WEEKBOARD_DB`, then `database`, then the local
    /// data directory.
    pub fn database_path(&self) -> PathBuf {
        if let Ok(p) = std::env::var("WEEKBOARD_DB") {
            return PathBuf::from(p);
        }
        if let Some(p) = &self.database {
            return p.clone();
        }
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push(APP_DIR);
        p.push(DB_FILE);
        p
    }
}
