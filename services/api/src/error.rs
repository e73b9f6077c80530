//! services/api/src/error.rs
//!
//! Startup failures of the site backend. Request handlers map their own errors
//! to HTTP responses; only `main` returns `ApiError`.

use crate::config::ConfigError;
use site_core::ports::PortError;

/// Why the site backend could not start or stopped serving.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required environment variable is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The analytics log could not be prepared.
    #[error("Analytics store error: {0}")]
    Port(#[from] PortError),

    /// Connecting to the contact submissions database failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Startup settings that parse as text but are unusable, such as a bad CORS origin.
    #[error("Startup error: {0}")]
    Internal(String),
}
