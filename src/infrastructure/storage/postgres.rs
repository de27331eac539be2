//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// PostgreSQL pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/identity".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 3,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Build from the `database` configuration section, if a URL is set
    pub fn from_database_config(config: &DatabaseConfig) -> Option<Self> {
        config.url.as_ref().map(|url| {
            Self::new(url.clone())
                .with_max_connections(config.max_connections)
                .with_connect_timeout(config.connect_timeout_secs)
        })
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Open the connection pool
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        info!(max_connections = self.max_connections, "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!("PostgreSQL connection established");

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_database_config() {
        let mut config = DatabaseConfig::default();
        assert!(PostgresConfig::from_database_config(&config).is_none());

        config.url = Some("postgres://db/identity".to_string());
        config.max_connections = 4;
        config.connect_timeout_secs = 7;

        let pg = PostgresConfig::from_database_config(&config).unwrap();
        assert_eq!(pg.url, "postgres://db/identity");
        assert_eq!(pg.max_connections, 4);
        assert_eq!(pg.connect_timeout_secs, 7);
    }
}
