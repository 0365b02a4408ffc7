use crate::model::pagination::PaginationTheme;
use crate::services::store::DEFAULT_PAGE_SIZE;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file backing the users table
    pub database_path: String,
    /// Address `serve` listens on
    pub bind_address: String,
    /// Base URL the terminal UI talks to
    pub api_base_url: String,
    /// Static employee directory served by `/api/employee`
    pub employees_path: String,
    pub export_dir: String,
    pub page_size: usize,
    pub pagination_theme: PaginationTheme,
    pub news_refresh_secs: u64,
    pub log_level: String,
    /// Log file of the terminal UI; empty means `<config dir>/users-admin.log`
    pub log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "users.db".to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            api_base_url: "http://127.0.0.1:3000".to_string(),
            employees_path: "data/employee.json".to_string(),
            export_dir: ".".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            pagination_theme: PaginationTheme::Numbered,
            news_refresh_secs: 5,
            log_level: "info".to_string(),
            log_path: String::new(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".users-admin"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config at `path`, falling back to defaults when there is
    /// no file. An unreadable file also yields defaults, and its error is
    /// handed back for the caller to report once logging is up.
    pub fn load_or_default(path: Option<&Path>) -> (Config, Option<ConfigError>) {
        match path {
            Some(path) if path.exists() => match Self::load_from(path) {
                Ok(config) => (config, None),
                Err(e) => (Config::default(), Some(e)),
            },
            _ => (Config::default(), None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the config to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
        }

        let contents = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(io_err)
    }

    /// Parsed `log_level`, `info` when unrecognized
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Where the terminal UI writes its log
    pub fn log_file(&self) -> PathBuf {
        if !self.log_path.is_empty() {
            return PathBuf::from(&self.log_path);
        }
        Self::config_dir()
            .map(|dir| dir.join("users-admin.log"))
            .unwrap_or_else(|| PathBuf::from("users-admin.log"))
    }
}
