//! Response record - the outcome of an inbound call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cookies;
use crate::value_objects::{Headers, RecordId};

/// A captured response, optionally linked to its request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    id: RecordId,
    /// Correlation only; the referenced request may never have been stored
    pub request_id: Option<RecordId>,
    created: DateTime<Utc>,
    pub application_name: Option<String>,
    pub application_version: Option<String>,
    pub machine_name: Option<String>,
    pub http_status_code: Option<i32>,
    pub response_headers: Headers,
    pub cookies: Cookies,
    pub elapsed_milliseconds: Option<u64>,
}

impl ResponseRecord {
    /// Create an empty record with a fresh id
    pub fn new() -> Self {
        Self::restore(RecordId::new(), Utc::now())
    }

    /// Recreate an empty record with a known identity
    pub fn restore(id: RecordId, created: DateTime<Utc>) -> Self {
        Self {
            id,
            request_id: None,
            created,
            application_name: None,
            application_version: None,
            machine_name: None,
            http_status_code: None,
            response_headers: Headers::new(),
            cookies: Cookies::new(),
            elapsed_milliseconds: None,
        }
    }

    pub const fn id(&self) -> RecordId {
        self.id
    }

    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Canonical camelCase JSON of the current state
    pub fn full_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl Default for ResponseRecord {
    fn default() -> Self {
        Self::new()
    }
}
