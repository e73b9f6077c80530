//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Number of events the admin table shows when `ADMIN_EVENT_LIMIT` is unset.
pub const DEFAULT_ADMIN_EVENT_LIMIT: usize = 500;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// HTTP Basic credentials that unlock the reporting views.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub analytics_csv_path: PathBuf,
    /// `None` disables every admin-gated route.
    pub admin: Option<AdminCredentials>,
    pub admin_event_limit: usize,
    pub static_dir: Option<PathBuf>,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // --- Load Server and Database Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Analytics and Admin Settings ---
        let analytics_csv_path = var("ANALYTICS_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/visits.csv"));

        let admin = match (var("ADMIN_USER"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            _ => None,
        };

        let admin_event_limit = match var("ADMIN_EVENT_LIMIT") {
            None => DEFAULT_ADMIN_EVENT_LIMIT,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "ADMIN_EVENT_LIMIT".to_string(),
                        format!("'{}' is not a positive integer", raw),
                    )
                })?,
        };

        // --- Load Optional Web Settings ---
        let static_dir = var("STATIC_DIR").map(PathBuf::from);
        let cors_allowed_origin = var("CORS_ALLOWED_ORIGIN");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            analytics_csv_path,
            admin,
            admin_event_limit,
            static_dir,
            cors_allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/site")]).unwrap();

        assert_eq!(
            config.bind_address,
            "0.0.0.0:5000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.analytics_csv_path, PathBuf::from("./data/visits.csv"));
        assert_eq!(config.admin, None);
        assert_eq!(config.admin_event_limit, DEFAULT_ADMIN_EVENT_LIMIT);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingVar(var)) if var == "DATABASE_URL"));
    }

    #[test]
    fn admin_requires_both_user_and_password() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("ADMIN_USER", "admin"),
        ])
        .unwrap();
        assert_eq!(config.admin, None);

        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("ADMIN_USER", "admin"),
            ("ADMIN_PASSWORD", ""),
        ])
        .unwrap();
        assert_eq!(config.admin, None);

        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("ADMIN_USER", "admin"),
            ("ADMIN_PASSWORD", "s3cret"),
        ])
        .unwrap();
        assert_eq!(
            config.admin,
            Some(AdminCredentials {
                username: "admin".to_string(),
                password: "s3cret".to_string(),
            })
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("ADMIN_EVENT_LIMIT", "0"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(var, _)) if var == "ADMIN_EVENT_LIMIT"));

        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("BIND_ADDRESS", "not-an-address"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(var, _)) if var == "BIND_ADDRESS"));
    }

    #[test]
    fn csv_path_can_be_overridden() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("ANALYTICS_CSV_PATH", "/var/lib/site/events.csv"),
        ])
        .unwrap();
        assert_eq!(
            config.analytics_csv_path,
            PathBuf::from("/var/lib/site/events.csv")
        );
    }

    #[test]
    fn admin_credentials_are_redacted_in_debug_output() {
        let credentials = AdminCredentials {
            username: "admin".to_string(),
            password: "s3cret".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("s3cret"));
    }
}
