//! Metadata stamped onto every captured record

use serde::{Deserialize, Serialize};

/// Name, version and host of the process producing records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
    pub machine_name: String,
}

impl ApplicationInfo {
    /// Application metadata for the current machine
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            machine_name: machine_name(),
        }
    }

    /// Override the detected machine name
    #[must_use]
    pub fn with_machine_name(mut self, machine_name: impl Into<String>) -> Self {
        self.machine_name = machine_name.into();
        self
    }
}

/// `ApplicationInfo` for the calling crate, from its Cargo metadata
#[macro_export]
macro_rules! application_info {
    () => {
        $crate::ApplicationInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}

/// Host name of this machine
///
/// `HOSTNAME`, then `COMPUTERNAME`, then `/etc/hostname`; `"unknown"` if none
/// is available.
pub fn machine_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
