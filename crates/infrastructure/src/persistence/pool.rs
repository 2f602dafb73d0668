// Connection pool configuration read from the environment.

use person_registry_domain::{DomainError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/person_registry".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| {
            DomainError::infrastructure(format!("{name} must be a positive number, got '{value}'"))
        }),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// Reads `DATABASE_URL` plus the optional `REGISTRY_DB_*` pool knobs.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let url = env::var("DATABASE_URL")
            .map_err(|_| DomainError::infrastructure("DATABASE_URL is not set"))?;

        Ok(Self {
            url,
            max_connections: env_u32(
                "REGISTRY_DB_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            min_connections: env_u32(
                "REGISTRY_DB_MIN_CONNECTIONS",
                defaults.min_connections,
            )?,
            connection_timeout: Duration::from_secs(u64::from(env_u32(
                "REGISTRY_DB_CONNECTION_TIMEOUT_SECS",
                30,
            )?)),
        })
    }

    pub async fn connect(&self) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connection_timeout)
            .connect(&self.url)
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to connect to database: {e}"))
            })
    }
}
