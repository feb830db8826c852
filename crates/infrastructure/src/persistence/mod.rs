//! Persistence module
//!
//! SQLite-based storage for telemetry records, on a shared sqlx pool.

pub mod async_connection;
pub mod error;
pub mod telemetry_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use error::map_sqlx_error;
pub use telemetry_store::SqliteTelemetryStore;
