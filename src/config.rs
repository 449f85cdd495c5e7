use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::credentials::PasswordHasher;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the clinic database lives and how it is opened
    pub database: DatabaseConfig,
    /// Log level, format and optional file
    pub logging: LoggingConfig,
    /// Credential hashing parameters
    pub security: SecurityConfig,
}

/// Database section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, optionally prefixed with `sqlite:`
    pub url: String,
    /// Pool size; 1 keeps a single long-lived connection
    pub max_connections: u32,
    /// How long to wait for a free connection
    pub connection_timeout_secs: u64,
    /// Turn on SQLite foreign key enforcement for every connection
    pub foreign_keys: bool,
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
    /// Optional log file; rotated daily in its directory
    pub file_path: Option<String>,
    /// "json" or "text"
    pub format: String,
}

/// Security section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// PBKDF2 rounds for newly stored passwords
    pub pbkdf2_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/clinic.db".to_string(),
                max_connections: 1,
                connection_timeout_secs: 30,
                foreign_keys: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            security: SecurityConfig {
                pbkdf2_iterations: PasswordHasher::DEFAULT_ITERATIONS,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration with precedence: defaults, `config/default`,
    /// `config/local`, the explicit file (if any), then `CLINIC_*` variables
    /// (`CLINIC_DATABASE__URL` and so on).
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default(
                "database.connection_timeout_secs",
                defaults.database.connection_timeout_secs,
            )?
            .set_default("database.foreign_keys", defaults.database.foreign_keys)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("security.pbkdf2_iterations", defaults.security.pbkdf2_iterations)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("CLINIC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(anyhow::anyhow!("database url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("max_connections must be greater than 0"));
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(anyhow::anyhow!("connection_timeout_secs must be greater than 0"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.security.pbkdf2_iterations == 0 {
            return Err(anyhow::anyhow!("pbkdf2_iterations must be greater than 0"));
        }

        Ok(())
    }

    /// Get database URL from environment or config
    #[must_use]
    pub fn get_database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.database.url.clone())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Password hasher built from the security section
    #[must_use]
    pub const fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.security.pbkdf2_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.url, "sqlite:data/clinic.db");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
