use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::mode::{Mode, ModeParseError};
use crate::store::DEFAULT_CAPTURE_FILE_EXTENSION;

/// Environment variable overriding the configured mode.
pub const ENV_CAPTURE_REPLAY_MODE: &str = "CAPTURE_REPLAY_MODE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid CAPTURE_REPLAY_MODE: {0}")]
    Mode(#[from] ModeParseError),
}

/// Capture/replay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Operating mode. Required: wiring fails without it.
    pub mode: Option<Mode>,
    /// Where capture files go
    pub store: StoreConfig,
    /// Pretty-print capture files
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// One file per capture key under `path`
    Directory {
        path: Option<String>,
        extension: String,
    },
    /// Private temp directory removed when the store goes away
    Temporary,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    Directory,
    Temporary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlStoreConfig {
    pub kind: Option<StoreKind>,
    pub path: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlMapperConfig {
    pub pretty: Option<bool>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// off / disabled / capture / replay, any case
    pub mode: Option<Mode>,
    /// Capture store configuration
    pub store: Option<TomlStoreConfig>,
    /// Data mapper configuration
    pub mapper: Option<TomlMapperConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: None,
            store: StoreConfig::Directory {
                path: None,
                extension: DEFAULT_CAPTURE_FILE_EXTENSION.to_string(),
            },
            pretty: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config = toml::from_str::<TomlConfig>(contents)?;
        Ok(Self::default().merge(toml_config))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), mode = ?config.mode, "Loaded capture/replay config");
        Ok(config)
    }

    /// Load `path` if given, otherwise start from defaults, then apply
    /// `CAPTURE_REPLAY_MODE` from the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Apply `CAPTURE_REPLAY_MODE` from the environment, if set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_CAPTURE_REPLAY_MODE).ok();
        self.with_mode_override(raw.as_deref())
    }

    pub fn with_mode_override(mut self, raw: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = raw.filter(|r| !r.trim().is_empty()) {
            self.mode = Some(raw.parse()?);
        }
        Ok(self)
    }

    fn merge(mut self, toml_config: TomlConfig) -> Self {
        if let Some(mode) = toml_config.mode {
            self.mode = Some(mode);
        }

        if let Some(store) = toml_config.store {
            match store.kind.unwrap_or(StoreKind::Directory) {
                StoreKind::Temporary => self.store = StoreConfig::Temporary,
                StoreKind::Directory => {
                    self.store = StoreConfig::Directory {
                        path: store.path,
                        extension: store
                            .extension
                            .unwrap_or_else(|| DEFAULT_CAPTURE_FILE_EXTENSION.to_string()),
                    }
                }
            }
        }

        if let Some(mapper) = toml_config.mapper {
            if let Some(pretty) = mapper.pretty {
                self.pretty = pretty;
            }
        }

        self
    }
}
