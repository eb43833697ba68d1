//! TTAL - Two Truths and a Lie
//!
//! A timed trivia game: pick a category, spot the false statement in each
//! set of three before the shared countdown runs out, and clear the
//! category with enough correct answers.

use std::fmt;

pub mod app;
pub mod catalog;
pub mod config;
pub mod game;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum TtalError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// Configuration validation or parsing error
    ConfigError(String),
    /// Quiz catalog could not be fetched or parsed
    DataUnavailable(String),
    /// Quiz catalog parsed but failed validation
    InvalidCatalog(String),
    /// Category name not present in the catalog
    UnknownCategory(String),
    /// TUI rendering or interaction error
    TuiError(String),
    /// Timer task management error
    TimerError(String),
}

impl fmt::Display for TtalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtalError::IoError(err) => write!(f, "I/O error: {}", err),
            TtalError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            TtalError::DataUnavailable(msg) => write!(f, "Quiz data unavailable: {}", msg),
            TtalError::InvalidCatalog(msg) => write!(f, "Invalid quiz catalog: {}", msg),
            TtalError::UnknownCategory(name) => write!(f, "Unknown category: {}", name),
            TtalError::TuiError(msg) => write!(f, "TUI error: {}", msg),
            TtalError::TimerError(msg) => write!(f, "Timer error: {}", msg),
        }
    }
}

impl std::error::Error for TtalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TtalError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TtalError {
    fn from(err: std::io::Error) -> Self {
        TtalError::IoError(err)
    }
}

impl From<serde_json::Error> for TtalError {
    fn from(err: serde_json::Error) -> Self {
        TtalError::DataUnavailable(format!("JSON parsing error: {}", err))
    }
}

impl From<toml::de::Error> for TtalError {
    fn from(err: toml::de::Error) -> Self {
        TtalError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for TtalError {
    fn from(err: toml::ser::Error) -> Self {
        TtalError::ConfigError(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for TTAL operations
pub type Result<T> = std::result::Result<T, TtalError>;

/// Error handling utilities
pub mod error {
    use super::TtalError;

    /// Whether the error leaves the game without a usable catalog
    pub fn is_data_error(error: &TtalError) -> bool {
        matches!(
            error,
            TtalError::DataUnavailable(_) | TtalError::InvalidCatalog(_)
        )
    }

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &TtalError) -> String {
        match error {
            TtalError::DataUnavailable(_) => "Error loading questions.".to_string(),
            TtalError::InvalidCatalog(msg) => {
                format!("Error loading questions: {}.", msg)
            }
            TtalError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            TtalError::UnknownCategory(name) => {
                format!("Category \"{}\" is not in the question set.", name)
            }
            TtalError::IoError(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                "Permission denied. Check file permissions.".to_string()
            }
            _ => error.to_string(),
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "ttal";
pub const CONFIG_FILE: &str = "ttal.toml";
pub const LOG_FILE: &str = "ttal.log";
pub const DEFAULT_CATALOG_PATH: &str = "data/sentences.json";
