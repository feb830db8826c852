//! Error record - a failure observed while serving or issuing a call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cookies, FormFields};
use crate::value_objects::{Headers, RecordId};

/// Stable 32-bit content hash
///
/// First four bytes of the BLAKE3 digest, little endian. Identical input
/// yields the identical value in every process.
pub fn content_hash(value: &str) -> i32 {
    let digest = blake3::hash(value.as_bytes());
    let bytes = digest.as_bytes();
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// A captured failure with the call context it occurred in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    id: RecordId,
    created: DateTime<Utc>,
    pub application_name: Option<String>,
    pub application_version: Option<String>,
    pub machine_name: Option<String>,
    /// Short error type name, or the status name for remote errors
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub host: Option<String>,
    pub url: Option<String>,
    pub http_method: Option<String>,
    pub http_status_code: Option<i32>,
    pub ip_address: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    /// Message, cause chain and (optionally) the full trace
    pub detail: Option<String>,
    pub sql: Option<String>,
    /// Groups identical failures on the same machine
    pub error_hash: Option<i32>,
    pub query_string: Option<String>,
    pub form: FormFields,
    pub cookies: Cookies,
    pub request_headers: Headers,
}

impl ErrorRecord {
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
            error_type: None,
            host: None,
            url: None,
            http_method: None,
            http_status_code: None,
            ip_address: None,
            source: None,
            message: None,
            detail: None,
            sql: None,
            error_hash: None,
            query_string: None,
            form: FormFields::new(),
            cookies: Cookies::new(),
            request_headers: Headers::new(),
        }
    }

    pub const fn id(&self) -> RecordId {
        self.id
    }

    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// `hash(detail)`, folded with `hash(machine_name)` when a machine is known
    ///
    /// `None` when there is no detail to hash.
    pub fn compute_hash(detail: Option<&str>, machine_name: Option<&str>) -> Option<i32> {
        let detail = detail.filter(|d| !d.is_empty())?;
        let hash = content_hash(detail);
        Some(match machine_name.filter(|m| !m.is_empty()) {
            Some(machine) => hash.wrapping_mul(397) ^ content_hash(machine),
            None => hash,
        })
    }

    /// Recompute `error_hash` from the current detail and machine name
    pub fn refresh_error_hash(&mut self) {
        self.error_hash =
            Self::compute_hash(self.detail.as_deref(), self.machine_name.as_deref());
    }

    /// Canonical camelCase JSON of the current state
    pub fn full_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl Default for ErrorRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_have_distinct_ids() {
        assert_ne!(ErrorRecord::new().id(), ErrorRecord::new().id());
        assert!(!ErrorRecord::new().id().is_empty());
    }

    #[test]
    fn hash_is_deterministic() {
        let a = ErrorRecord::compute_hash(Some("Error: boom"), Some("web-01"));
        let b = ErrorRecord::compute_hash(Some("Error: boom"), Some("web-01"));
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn hash_depends_on_machine() {
        let a = ErrorRecord::compute_hash(Some("Error: boom"), Some("web-01"));
        let b = ErrorRecord::compute_hash(Some("Error: boom"), Some("web-02"));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_without_machine_is_detail_hash() {
        let expected = content_hash("Error: boom");
        assert_eq!(ErrorRecord::compute_hash(Some("Error: boom"), None), Some(expected));
        assert_eq!(ErrorRecord::compute_hash(Some("Error: boom"), Some("")), Some(expected));
    }

    #[test]
    fn missing_detail_has_no_hash() {
        assert_eq!(ErrorRecord::compute_hash(None, Some("web-01")), None);
        assert_eq!(ErrorRecord::compute_hash(Some(""), Some("web-01")), None);
    }

    #[test]
    fn refresh_tracks_current_state() {
        let mut record = ErrorRecord::new();
        record.detail = Some("Error: boom".into());
        record.refresh_error_hash();
        let without_machine = record.error_hash;
        record.machine_name = Some("web-01".into());
        record.refresh_error_hash();
        assert_ne!(record.error_hash, without_machine);
    }

    #[test]
    fn full_json_is_camel_case_and_reflects_updates() {
        let mut record = ErrorRecord::new();
        record.http_status_code = Some(500);
        let before = record.full_json();
        assert!(before.contains("\"httpStatusCode\":500"));
        assert!(before.contains("\"type\":null"));

        record.error_type = Some("TimeoutError".into());
        let after = record.full_json();
        assert!(after.contains("\"type\":\"TimeoutError\""));
        assert!(after.contains(&format!("\"id\":\"{}\"", record.id())));
    }

    #[test]
    fn full_json_roundtrips() {
        let mut record = ErrorRecord::new();
        record.request_headers.append("Accept", "*/*");
        record.cookies.insert("session".into(), "abc".into());
        let parsed: ErrorRecord = serde_json::from_str(&record.full_json()).unwrap();
        assert_eq!(parsed, record);
    }
}
