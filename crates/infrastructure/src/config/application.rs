//! Identity stamped onto captured records.

use application::ApplicationInfo;
use serde::{Deserialize, Serialize};

/// Application identity overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSection {
    /// Application name (default: `faultline`)
    #[serde(default = "default_name")]
    pub name: String,

    /// Application version (default: this crate's version)
    #[serde(default = "default_version")]
    pub version: String,

    /// Machine name; detected from the host when unset
    #[serde(default)]
    pub machine_name: Option<String>,
}

fn default_name() -> String {
    "faultline".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for ApplicationSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            machine_name: None,
        }
    }
}

impl ApplicationSection {
    /// Convert to the metadata carried by every record
    #[must_use]
    pub fn to_application_info(&self) -> ApplicationInfo {
        let info = ApplicationInfo::new(&self.name, &self.version);
        match self.machine_name.as_deref().map(str::trim) {
            Some(machine) if !machine.is_empty() => info.with_machine_name(machine),
            _ => info,
        }
    }
}
