//! # edu-config
//!
//! Layered configuration loading for the approval engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`EDU_*` prefix, `__` as separator)
//! 2. Project-level `.edu/config.toml`
//! 3. User-level `~/.config/edu/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `EDU_DATABASE__PATH` -> `database.path`,
//! `EDU_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use edu_config::EduConfig;
//!
//! let config = EduConfig::load_with_dotenv().expect("config");
//! println!("database at {}", config.database.path);
//! ```

mod approval;
mod database;
mod error;
mod general;

pub use approval::ApprovalConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local configuration directory.
pub const PROJECT_DIR: &str = ".edu";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EduConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl EduConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading a `.env` file from the current
    /// directory or the workspace root.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("EDU_").split("__"))
    }

    /// Reject values that deserialize but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("edu").join("config.toml"))
    }

    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EduConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.path, ".edu/edu.db");
        assert!(config.approval.final_approvers.is_empty());
    }

    #[test]
    fn empty_database_path_is_rejected() {
        let mut config = EduConfig::default();
        config.database.path = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.path"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut config = EduConfig::default();
        config.general.default_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
