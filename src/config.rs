use crate::error::{Result, TaskifyError};
use crate::storage::DEFAULT_SLOT;
use crate::task::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "taskify";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub ui: UiSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the task slot and the log file.
    /// Defaults to `<data_local_dir>/taskify`.
    pub data_dir: Option<PathBuf>,
    /// Slot name; the list lives in `<data_dir>/<slot>.json`.
    pub slot: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub theme: Theme,
    /// Category preselected in the input line.
    pub default_category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "taskify=info".to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/taskify/config.toml`, or `./config.toml` when the
    /// platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_default()
            .join(CONFIG_FILE)
    }

    /// Loads and validates a config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&raw).map_err(|e| TaskifyError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| TaskifyError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let slot = &self.storage.slot;
        if slot.is_empty() {
            return Err(TaskifyError::InvalidConfig {
                field: "storage.slot".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TaskifyError::InvalidConfig {
                field: "storage.slot".to_string(),
                reason: format!("'{slot}' may only contain letters, digits, '-' and '_'"),
            });
        }
        if self.log.filter.trim().is_empty() {
            return Err(TaskifyError::InvalidConfig {
                field: "log.filter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Configured data dir, else the platform data dir, else `./.taskify`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".taskify"))
    }
}
