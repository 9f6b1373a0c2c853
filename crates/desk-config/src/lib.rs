//! # desk-config
//!
//! Layered configuration loading for Shopdesk using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SHOPDESK_*` prefix, `__` as separator)
//! 2. Project-level `.shopdesk/config.toml`
//! 3. User-level `~/.config/shopdesk/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SHOPDESK_AUTH__JWT_SECRET` -> `auth.jwt_secret`,
//! `SHOPDESK_SERVER__LISTEN` -> `server.listen`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use desk_config::DeskConfig;
//!
//! let config = DeskConfig::load_with_dotenv().expect("config");
//! let secret = config.auth.require_jwt_secret().expect("run `desk init` first");
//! ```

mod auth;
mod business;
mod database;
mod error;
mod general;
mod server;

pub use auth::AuthConfig;
pub use business::BusinessConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local state (config and database).
pub const PROJECT_DIR_NAME: &str = ".shopdesk";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SHOPDESK_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DeskConfig {
    /// Load configuration for the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with `project_dir` as the project root.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_from(project_dir: &Path) -> Result<Self, ConfigError> {
        Self::figment_for(project_dir)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then load configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain rooted at `project_dir`.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment_for(project_dir: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = Self::project_config_path(project_dir);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// `<project_dir>/.shopdesk/config.toml`.
    #[must_use]
    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_DIR_NAME).join("config.toml")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shopdesk").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = DeskConfig::default();
        assert!(!config.auth.is_configured());
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.database.path, ".shopdesk/shopdesk.db");
        assert_eq!(config.business.default_min_stock, 5);
    }

    #[test]
    fn project_config_path_is_under_project_dir() {
        assert_eq!(
            DeskConfig::project_config_path(Path::new("/srv/shop")),
            PathBuf::from("/srv/shop/.shopdesk/config.toml")
        );
    }
}
