use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "manager-tasks";
const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_LOG_FILTER: &str = "info";

// On-disk form, every field optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    accounts_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub accounts_path: PathBuf,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub fn config_file() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .ok_or(ConfigError::MissingDir("config"))
    }

    /// Reads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Config::config_file()?;
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or(ConfigError::MissingDir("config"))?;
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(ConfigError::MissingDir("data"))?;

        let mut config = Config::from_path(&path, &config_dir, &data_dir)?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_path(
        path: &Path,
        config_dir: &Path,
        data_dir: &Path,
    ) -> Result<Config, ConfigError> {
        let file = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Config::resolve(file, config_dir, data_dir))
    }

    fn resolve(file: FileConfig, config_dir: &Path, data_dir: &Path) -> Config {
        Config {
            api_url: file.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            accounts_path: file
                .accounts_path
                .unwrap_or_else(|| config_dir.join("accounts.json")),
            data_dir: file.data_dir.unwrap_or_else(|| data_dir.to_path_buf()),
            log_filter: file
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("MANAGER_TASKS_API_URL") {
            self.api_url = url;
        }
        if let Some(path) = var("MANAGER_TASKS_ACCOUNTS") {
            self.accounts_path = PathBuf::from(path);
        }
        if let Some(dir) = var("MANAGER_TASKS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = var("RUST_LOG") {
            self.log_filter = filter;
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("manager-tasks.log")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}
