use std::path::Path;

use crate::checkpoint::RunStoreConfig;
use crate::error::ConfigError;
use crate::game::DEFAULT_STONES;
use crate::training::trainer::TrainerConfig;

/// Game settings shared by training and play.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_stones: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_stones: DEFAULT_STONES,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub training: TrainerConfig,
    pub run: RunStoreConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.initial_stones == 0 {
            return Err(ConfigError::Validation(
                "game.initial_stones must be >= 1".into(),
            ));
        }

        self.training.validate()?;

        if self.run.env_id.is_empty() || self.run.env_id.contains("__") {
            return Err(ConfigError::Validation(
                "run.env_id must be non-empty and must not contain '__'".into(),
            ));
        }
        if self.run.exp_name.is_empty() || self.run.exp_name.contains("__") {
            return Err(ConfigError::Validation(
                "run.exp_name must be non-empty and must not contain '__'".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
