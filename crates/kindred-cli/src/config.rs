//! Workspace configuration stored in `.kindred/config.json`.

use kindred_graph::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATE_DIR: &str = ".kindred";
const CONFIG_FILE: &str = "config.json";
const DB_DIR: &str = "db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindredConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Generation bound for family tree queries.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,

    /// Interface `serve` binds to unless `--headless` is given.
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_tree_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7460
}

impl Default for KindredConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            max_tree_depth: default_max_tree_depth(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl KindredConfig {
    /// Reads the config under `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = config_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json { path, source })
    }

    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = config_path(dir);
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| ConfigError::Io { path, source })
    }
}

pub fn state_dir(dir: &Path) -> PathBuf {
    dir.join(STATE_DIR)
}

pub fn config_path(dir: &Path) -> PathBuf {
    state_dir(dir).join(CONFIG_FILE)
}

pub fn db_path(dir: &Path) -> PathBuf {
    state_dir(dir).join(DB_DIR)
}
