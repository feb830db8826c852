//! Telemetry record identifier used for correlation
//!
//! # Examples
//!
//! ```
//! use domain::RecordId;
//!
//! let id = RecordId::new();
//! assert!(!id.is_empty());
//! assert!(RecordId::EMPTY.is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier assigned to a captured record
///
/// The all-zero [`RecordId::EMPTY`] value means "not persisted" and is what
/// the capture pipeline hands back when a record could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Sentinel for a record that was never persisted
    pub const EMPTY: Self = Self(Uuid::nil());

    /// Create a new random record ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a record ID from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a record ID from a string
    ///
    /// # Errors
    /// Returns an error if the string is not a valid UUID
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Whether this is the "not persisted" sentinel
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// `None` for the sentinel, `Some(self)` otherwise
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_id_is_unique() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn new_record_id_is_not_empty() {
        assert!(!RecordId::new().is_empty());
    }

    #[test]
    fn empty_sentinel_is_nil() {
        assert!(RecordId::EMPTY.is_empty());
        assert_eq!(RecordId::EMPTY.as_uuid(), Uuid::nil());
        assert_eq!(
            RecordId::EMPTY.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn non_empty_filters_sentinel() {
        let id = RecordId::new();
        assert_eq!(id.non_empty(), Some(id));
        assert_eq!(RecordId::EMPTY.non_empty(), None);
    }

    #[test]
    fn record_id_roundtrips_through_string() {
        let original = RecordId::new();
        let parsed = RecordId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn from_uuid_trait() {
        let uuid = Uuid::new_v4();
        let id: RecordId = uuid.into();
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn parse_invalid_uuid_fails() {
        assert!(RecordId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn record_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&RecordId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
