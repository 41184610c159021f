//! Configuration management
//!
//! Read once at startup from the environment (optionally seeded by a `.env`
//! file). The store connection string and database name are mandatory; the
//! process refuses to start without them.

use serde::{Deserialize, Serialize};
use sirene_common::{Result, SireneError};
use std::time::Duration;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default per-request deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default collection holding establishment documents.
pub const DEFAULT_MONGODB_COLLECTION: &str = "etablissements";

/// Default driver connect timeout in seconds.
pub const DEFAULT_MONGODB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default driver server selection timeout in seconds.
pub const DEFAULT_MONGODB_SERVER_SELECTION_TIMEOUT_SECS: u64 = 10;

/// Default CORS allowed origin (the Angular front-end in development).
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:4200";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub connection_string: String,
    pub database_name: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    /// Configuration for the given store with default collection and timeouts
    pub fn new(connection_string: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: database_name.into(),
            collection: DEFAULT_MONGODB_COLLECTION.to_string(),
            connect_timeout_secs: DEFAULT_MONGODB_CONNECT_TIMEOUT_SECS,
            server_selection_timeout_secs: DEFAULT_MONGODB_SERVER_SELECTION_TIMEOUT_SECS,
        }
    }
}

/// CORS configuration
///
/// Exactly one origin is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => Err(SireneError::config(format!("{} is set but empty", name))),
        Err(_) => Err(SireneError::config(format!("{} is not set", name))),
    }
}

/// Optional variable; unset or blank takes the default, anything else must parse
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().map_err(|_| {
            SireneError::config(format!("{} has an invalid value: '{}'", name, value))
        }),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("SIRENE_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("SIRENE_PORT", DEFAULT_SERVER_PORT)?,
                shutdown_timeout_secs: env_or(
                    "SIRENE_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                )?,
                request_timeout_secs: env_or(
                    "SIRENE_REQUEST_TIMEOUT",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
            },
            mongodb: MongoConfig {
                connection_string: required_env("MONGODB_CONNECTION_STRING")?,
                database_name: required_env("MONGODB_DATABASE_NAME")?,
                collection: std::env::var("MONGODB_COLLECTION")
                    .unwrap_or_else(|_| DEFAULT_MONGODB_COLLECTION.to_string()),
                connect_timeout_secs: env_or(
                    "MONGODB_CONNECT_TIMEOUT_SECS",
                    DEFAULT_MONGODB_CONNECT_TIMEOUT_SECS,
                )?,
                server_selection_timeout_secs: env_or(
                    "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                    DEFAULT_MONGODB_SERVER_SELECTION_TIMEOUT_SECS,
                )?,
            },
            cors: CorsConfig {
                allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string()),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SireneError::config("Server port must be greater than 0"));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(SireneError::config("Request timeout must be greater than 0"));
        }

        if !self.mongodb.connection_string.starts_with("mongodb://")
            && !self.mongodb.connection_string.starts_with("mongodb+srv://")
        {
            return Err(SireneError::config(
                "MongoDB connection string must start with mongodb:// or mongodb+srv://",
            ));
        }

        if self.mongodb.database_name.is_empty() {
            return Err(SireneError::config("MongoDB database name cannot be empty"));
        }

        if self.mongodb.collection.is_empty() {
            return Err(SireneError::config("MongoDB collection name cannot be empty"));
        }

        let origin = self.cors.allowed_origin.trim();
        if origin.is_empty() || origin == "*" {
            return Err(SireneError::config(
                "CORS_ALLOWED_ORIGIN must name exactly one origin",
            ));
        }
        if origin.contains(',') {
            return Err(SireneError::config(
                "CORS_ALLOWED_ORIGIN accepts a single origin, not a list",
            ));
        }

        Ok(())
    }
}
