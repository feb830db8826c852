//! Request record - an inbound call as it arrived

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cookies, FormFields};
use crate::value_objects::{Claim, Headers, RecordId};

/// A captured inbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    id: RecordId,
    created: DateTime<Utc>,
    pub application_name: Option<String>,
    pub application_version: Option<String>,
    pub machine_name: Option<String>,
    pub username: Option<String>,
    /// Request url without its query string
    pub url: Option<String>,
    pub http_method: Option<String>,
    pub ip_address: Option<String>,
    /// Raw body text (lossy UTF-8)
    pub body: Option<String>,
    pub query_string: Option<String>,
    /// Headers after filtering
    pub request_headers: Headers,
    pub cookies: Cookies,
    pub form: FormFields,
    pub claims: Vec<Claim>,
}

impl RequestRecord {
    /// Create an empty record with a fresh id
    pub fn new() -> Self {
        Self::restore(RecordId::new(), Utc::now())
    }

    /// Recreate an empty record with a known identity
    pub fn restore(id: RecordId, created: DateTime<Utc>) -> Self {
        Self {
            id,
            created,
            application_name: None,
            application_version: None,
            machine_name: None,
            username: None,
            url: None,
            http_method: None,
            ip_address: None,
            body: None,
            query_string: None,
            request_headers: Headers::new(),
            cookies: Cookies::new(),
            form: FormFields::new(),
            claims: Vec::new(),
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

impl Default for RequestRecord {
    fn default() -> Self {
        Self::new()
    }
}
