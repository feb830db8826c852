//! SQLite connection pool for the telemetry store
//!
//! Connection settings live on [`SqliteConnectOptions`], so every pooled
//! connection opens with the same journal mode, sync level and busy timeout.
//! Migrations are embedded with sqlx's `migrate!()` from the workspace
//! `migrations/` directory.

use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use tracing::{debug, info, instrument};

/// Failure to open or migrate the telemetry database
#[derive(Debug, thiserror::Error)]
pub enum AsyncDatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool settings for the telemetry database
#[derive(Debug, Clone)]
pub struct AsyncDatabaseConfig {
    /// sqlx URL, `sqlite:<path>` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// WAL journal with `synchronous=NORMAL`; ignored for in-memory databases
    pub wal_mode: bool,
    pub foreign_keys: bool,
    /// How long a writer waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl Default for AsyncDatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:faultline.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            wal_mode: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl AsyncDatabaseConfig {
    /// A private in-memory database on a single connection
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            wal_mode: false,
            ..Self::default()
        }
    }

    /// A database file at `path`, created on first use
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref().display()),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    /// Per-connection options derived from this config
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, AsyncDatabaseError> {
        let options = SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .foreign_keys(self.foreign_keys)
            .busy_timeout(self.busy_timeout);

        if self.wal_mode && !self.is_in_memory() {
            Ok(options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal))
        } else {
            Ok(options)
        }
    }
}

/// Pooled handle to the telemetry database
#[derive(Debug, Clone)]
pub struct AsyncDatabase {
    pool: SqlitePool,
}

impl AsyncDatabase {
    /// Open the pool; connections are created lazily up to `max_connections`
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn new(config: &AsyncDatabaseConfig) -> Result<Self, AsyncDatabaseError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(config.connect_options()?)
            .await?;

        info!(
            max_connections = config.max_connections,
            wal = config.wal_mode && !config.is_in_memory(),
            "Telemetry database opened"
        );
        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self, AsyncDatabaseError> {
        Self::new(&AsyncDatabaseConfig::in_memory()).await
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending migrations
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), AsyncDatabaseError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Telemetry schema up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Telemetry database closed");
    }
}
