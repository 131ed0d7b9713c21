//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GOMARKET_STORAGE_KEY` - Key the cart is stored under (default: `@GoMarketPlace`)
//! - `GOMARKET_DATA_DIR` - Directory for the file-backed store (default: `.gomarket`)

use std::path::PathBuf;

use thiserror::Error;

/// Default storage key, shared with every client that reads the same cart.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketPlace";

/// Default directory for [`crate::FileStore`].
pub const DEFAULT_DATA_DIR: &str = ".gomarket";

const STORAGE_KEY_VAR: &str = "GOMARKET_STORAGE_KEY";
const DATA_DIR_VAR: &str = "GOMARKET_DATA_DIR";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the whole cart collection is stored under
    pub storage_key: String,
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = lookup(STORAGE_KEY_VAR).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        validate_storage_key(&storage_key, STORAGE_KEY_VAR)?;

        let data_dir = lookup(DATA_DIR_VAR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        if data_dir.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                DATA_DIR_VAR.to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            storage_key,
            data_dir: PathBuf::from(data_dir),
        })
    }

    /// Override the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Override the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

/// Validate that a storage key is usable.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must not be empty".to_string(),
        ));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must not contain whitespace (got {key:?})"),
        ));
    }
    Ok(())
}
