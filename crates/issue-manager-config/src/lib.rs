//! Policy configuration parsing and validation for issue-manager
//!
//! Supports JSON (the usual inline form) and TOML files with:
//! - Keyword → policy mapping, order preserved
//! - Delays as seconds, ISO-8601 or clock strings
//! - Optional reminders and label-removal flags
//! - Validation with every error reported at once

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default inactivity delay before closing (10 days)
pub const DEFAULT_DELAY_SECS: i64 = 10 * 86_400;

/// Default reminder lead time (1 day)
pub const DEFAULT_REMINDER_DELAY_SECS: i64 = 86_400;

pub const DEFAULT_CLOSE_MESSAGE: &str = "Assuming the original need was handled, this will be automatically closed now. But feel free to add more comments or create new issues or PRs.";

pub const DEFAULT_REMINDER_MESSAGE: &str =
    "This will be closed automatically soon if there's no further activity.";

/// Source format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load and validate configuration from a file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<PolicySet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse and validate configuration from a string
pub fn parse_config(content: &str, format: ConfigFormat) -> ConfigResult<PolicySet> {
    let raw: RawConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };

    if let Some(schema) = &raw.schema {
        debug!(schema = %schema, "Ignoring schema pointer");
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(PolicySet::from_raw(raw))
}
