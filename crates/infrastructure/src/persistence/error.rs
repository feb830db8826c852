//! Shared error mapping for sqlx persistence layer

use application::error::ApplicationError;

/// Map a sqlx error to an application-layer error
pub fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            ApplicationError::Persistence(format!("Database unavailable: {e}"))
        },
        sqlx::Error::Io(io) => ApplicationError::Persistence(format!("Database I/O error: {io}")),
        sqlx::Error::Database(db_err) => {
            ApplicationError::Persistence(format!("Database error: {db_err}"))
        },
        other => ApplicationError::Internal(format!("Database error: {other}")),
    }
}
