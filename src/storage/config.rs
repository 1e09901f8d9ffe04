use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::AccountId;
use crate::ui::DayColumnConfig;
use crate::viewport::ZoomPolicy;

pub const APP_DIR: &str = "calstrip";
pub const DEFAULT_CALENDAR_ID: &str = "primary";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub accounts: AccountsConfig,
    pub timeline: TimelineConfig,
    pub zoom: ZoomPolicy,
    pub day_column: DayColumnConfig,
    pub ui: UiConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountConfig {
    pub enabled: bool,
    pub calendar_id: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AccountsConfig {
    pub work: AccountConfig,
    pub private: AccountConfig,
}

impl AccountsConfig {
    pub fn get(&self, account: AccountId) -> &AccountConfig {
        match account {
            AccountId::Work => &self.work,
            AccountId::Private => &self.private,
        }
    }

    pub fn enabled(&self) -> Vec<AccountId> {
        AccountId::ALL
            .into_iter()
            .filter(|account| self.get(*account).enabled)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    pub days_before: u32,
    pub days_after: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            days_before: 60,
            days_after: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    pub cell_width_px: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            cell_width_px: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { page_size: 250 }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.google.client_id.is_empty() && !self.google.client_secret.is_empty()
    }
}
