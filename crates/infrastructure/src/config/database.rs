//! Database (SQLite) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;
use crate::persistence::AsyncDatabaseConfig;

/// SQLite database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:faultline.db`
    #[serde(default = "default_db_url")]
    pub url: String,

    /// Maximum number of concurrent database connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Enable WAL journal mode
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Milliseconds a writer waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Whether to run pending migrations on startup (default: true)
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_url() -> String {
    "sqlite:faultline.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
            wal_mode: true,
            busy_timeout_ms: default_busy_timeout_ms(),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Convert to the pool configuration
    #[must_use]
    pub fn to_async_config(&self) -> AsyncDatabaseConfig {
        let in_memory = self.url.contains(":memory:");
        AsyncDatabaseConfig {
            url: self.url.clone(),
            max_connections: if in_memory { 1 } else { self.max_connections },
            wal_mode: self.wal_mode && !in_memory,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            ..AsyncDatabaseConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_timeout_reaches_pool_config() {
        let config = DatabaseConfig {
            busy_timeout_ms: 750,
            ..DatabaseConfig::default()
        };
        assert_eq!(
            config.to_async_config().busy_timeout,
            Duration::from_millis(750)
        );
    }

    #[test]
    fn in_memory_url_forces_single_connection() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 8,
            ..DatabaseConfig::default()
        };
        let pool = config.to_async_config();
        assert_eq!(pool.max_connections, 1);
        assert!(!pool.wal_mode);
    }
}
