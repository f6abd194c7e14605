/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables
 * and opens the chat store.
 *
 * # Configuration Sources
 *
 * | Variable | Default |
 * |----------|---------|
 * | `SERVER_PORT` | `3000` |
 * | `JWT_SECRET` | development secret, with a warning |
 * | `DATABASE_URL` | unset: in-memory store |
 * | `HUB_*` | see [`HubConfig::from_env`] |
 *
 * # Error Handling
 *
 * A malformed `HUB_*` value is a startup error. A missing or unreachable
 * database is not: it is logged and the server falls back to the
 * in-memory store.
 */
use std::sync::Arc;

use crate::backend::store::{ChatStore, MemoryStore, PostgresStore};
use crate::shared::config::{ConfigError, HubConfig};

/// Secret used when `JWT_SECRET` is not set. Never use it in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "chathub-development-secret";

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub hub: HubConfig,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("SERVER_PORT") {
            None => DEFAULT_PORT,
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value,
            })?,
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set. Using the development secret.");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let hub = HubConfig::from_lookup(&lookup)?;

        Ok(Self {
            port,
            jwt_secret,
            database_url,
            hub,
        })
    }
}

/// Open the chat store for `database_url`.
///
/// # Returns
///
/// - A migrated `PostgresStore` when a URL is given and the database is
///   reachable
/// - A `MemoryStore` otherwise
///
/// # Errors
///
/// Errors are logged but do not prevent server startup.
pub async fn load_store(database_url: Option<&str>) -> Arc<dyn ChatStore> {
    let Some(url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store.");
        return Arc::new(MemoryStore::new());
    };

    tracing::info!("Connecting to database...");
    let store = match PostgresStore::connect(url).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return Arc::new(MemoryStore::new());
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = store.migrate().await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Continuing without migrations - database might not be up to date");
    }

    Arc::new(store)
}
