//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the SQLite telemetry
//! store, the bearer-token claim resolver and static endpoint resolution.
//! Also owns configuration loading, logging setup, HTTP fault mapping and
//! classified retry execution.

pub mod adapters;
pub mod config;
pub mod http;
pub mod logging;
pub mod persistence;
pub mod retry;

pub use adapters::*;
pub use config::{
    AppConfig, ApplicationSection, CaptureConfig, DatabaseConfig, EndpointConfig, RetryAppConfig,
};
pub use http::{
    FaultSource, ServiceCallError, ServiceClient, ServiceClientConfig, X_REQUEST_ID,
    fault_from_reqwest, fault_from_status,
};
pub use logging::{LogFormat, LoggingConfig, LoggingError, init_logging};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteTelemetryStore, map_sqlx_error,
};
pub use retry::{BackoffConfig, ClassifiedRetryError, RetryResult, with_classified_retry};
