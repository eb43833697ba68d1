//! Configuration management module
//!
//! Handles loading, saving, and validation of the game settings: where the
//! question catalog lives and the timing and scoring rules.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::GameRules;
use crate::util::clock::duration_str;
use crate::{Result, TtalError, APP_NAME, CONFIG_FILE, DEFAULT_CATALOG_PATH};

/// User-facing game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// JSON file holding the question catalog
    pub catalog_path: PathBuf,
    /// Countdown budget for one category attempt
    #[serde(with = "duration_str")]
    pub time_limit: Duration,
    /// Time removed by a wrong answer
    #[serde(with = "duration_str")]
    pub wrong_answer_penalty: Duration,
    /// Pause after an answer before the next set
    #[serde(with = "duration_str")]
    pub next_set_delay: Duration,
    /// How long the penalty indicator is shown
    #[serde(with = "duration_str")]
    pub penalty_indicator: Duration,
    /// Countdown refresh granularity
    #[serde(with = "duration_str")]
    pub tick_interval: Duration,
    /// Correct answers needed to pass a category
    pub min_correct_to_pass: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let rules = GameRules::default();
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            time_limit: rules.time_limit,
            wrong_answer_penalty: rules.wrong_answer_penalty,
            next_set_delay: rules.next_set_delay,
            penalty_indicator: rules.penalty_indicator,
            tick_interval: rules.tick_interval,
            min_correct_to_pass: rules.min_correct_to_pass,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.catalog_path.as_os_str().is_empty() {
            return Err(TtalError::ConfigError(
                "Catalog path must not be empty".to_string(),
            ));
        }

        if self.time_limit.is_zero() {
            return Err(TtalError::ConfigError(
                "Time limit must be greater than 0".to_string(),
            ));
        }

        const MAX_TIME_LIMIT: Duration = Duration::from_secs(3600); // 1 hour
        if self.time_limit > MAX_TIME_LIMIT {
            return Err(TtalError::ConfigError(format!(
                "Time limit too long: {}s (max: {}s)",
                self.time_limit.as_secs(),
                MAX_TIME_LIMIT.as_secs()
            )));
        }

        if self.tick_interval.is_zero() {
            return Err(TtalError::ConfigError(
                "Tick interval must be greater than 0".to_string(),
            ));
        }

        if self.tick_interval > self.time_limit {
            return Err(TtalError::ConfigError(
                "Tick interval must not exceed the time limit".to_string(),
            ));
        }

        if self.wrong_answer_penalty > self.time_limit {
            return Err(TtalError::ConfigError(
                "Wrong answer penalty must not exceed the time limit".to_string(),
            ));
        }

        const MAX_DELAY: Duration = Duration::from_secs(30);
        if self.next_set_delay > MAX_DELAY || self.penalty_indicator > MAX_DELAY {
            return Err(TtalError::ConfigError(format!(
                "Display delays must be at most {}s",
                MAX_DELAY.as_secs()
            )));
        }

        if self.min_correct_to_pass == 0 {
            return Err(TtalError::ConfigError(
                "Correct answers needed to pass must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Rules handed to the game core
    pub fn rules(&self) -> GameRules {
        GameRules {
            time_limit: self.time_limit,
            wrong_answer_penalty: self.wrong_answer_penalty,
            next_set_delay: self.next_set_delay,
            penalty_indicator: self.penalty_indicator,
            tick_interval: self.tick_interval,
            min_correct_to_pass: self.min_correct_to_pass,
        }
    }

    /// Set the catalog path
    pub fn with_catalog_path(mut self, path: PathBuf) -> Self {
        self.catalog_path = path;
        self
    }

    /// Set the category time limit
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Set the pass threshold
    pub fn with_min_correct_to_pass(mut self, count: u32) -> Self {
        self.min_correct_to_pass = count;
        self
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    /// Returns default configuration if file doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            TtalError::ConfigError(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            TtalError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        // Validate the loaded configuration
        config.validate()?;

        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Validate before saving
        self.validate()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TtalError::ConfigError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| {
            TtalError::ConfigError(format!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/ttal/ttal.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            TtalError::ConfigError("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// Default log file location: $DATA_HOME/ttal/ttal.log, or the temp dir
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
        .join(crate::LOG_FILE)
}
