//! Exception-shaped description of a captured failure

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    error::Error,
};

use serde::{Deserialize, Serialize};

/// Everything an error record needs to know about a failure
///
/// Built either from a concrete error value with [`FaultInfo::from_error`]
/// or by hand for failures that do not originate from a Rust error type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInfo {
    /// Short type name, e.g. `TimeoutError`
    pub type_name: String,
    /// Top-level message
    pub message: String,
    /// Originating component, e.g. the crate that defined the error type
    pub source: Option<String>,
    /// Message plus the full cause chain
    pub detail: String,
    /// Statement that was executing when the failure occurred, if any
    pub sql: Option<String>,
    /// Captured backtrace, only present when backtraces are enabled
    pub backtrace: Option<String>,
}

impl FaultInfo {
    /// Describe a failure by type name and message
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let message = message.into();
        let detail = format!("{type_name}: {message}");
        Self {
            type_name,
            message,
            detail,
            ..Self::default()
        }
    }

    /// Describe a concrete error, walking its `source()` chain into `detail`
    ///
    /// A backtrace is recorded only when `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`
    /// enable it.
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let full_name = std::any::type_name::<E>();
        let type_name = short_type_name(full_name).to_string();
        let message = error.to_string();

        let mut detail = format!("{type_name}: {message}");
        let mut cause = error.source();
        while let Some(inner) = cause {
            detail.push_str("\n ---> ");
            detail.push_str(&inner.to_string());
            cause = inner.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace =
            (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string());

        Self {
            type_name,
            message,
            source: crate_of(full_name).map(str::to_string),
            detail,
            sql: None,
            backtrace,
        }
    }

    /// Attach the statement that was executing
    #[must_use]
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Override the originating component
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Override the detail text
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Attach a pre-rendered backtrace
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }
}

/// `std::io::error::Error` -> `Error`, `core::option::Option<u8>` -> `Option`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn crate_of(full: &str) -> Option<&str> {
    let base = full.split('<').next().unwrap_or(full);
    base.split_once("::").map(|(krate, _)| krate)
}
