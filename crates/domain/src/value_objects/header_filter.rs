//! Allow-list / deny-list filtering of captured headers
//!
//! # Examples
//!
//! ```
//! use domain::{HeaderFilter, Headers};
//!
//! let headers = Headers::new()
//!     .with("Authorization", "Bearer secret")
//!     .with("Accept", "application/json");
//!
//! let filtered = HeaderFilter::exclude_authorization().filter(&headers);
//! assert!(!filtered.contains("authorization"));
//! assert!(filtered.contains("accept"));
//! ```

use serde::{Deserialize, Serialize};

use super::Headers;
use crate::errors::DomainError;

/// Name of the header excluded by [`HeaderFilter::exclude_authorization`]
pub const AUTHORIZATION: &str = "authorization";

/// Filters a header collection by name, case-insensitively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "names", rename_all = "snake_case")]
pub enum HeaderFilter {
    /// Keep only the listed headers
    Include(Vec<String>),
    /// Drop the listed headers
    Exclude(Vec<String>),
}

impl HeaderFilter {
    /// Keep only the given header names
    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(names.into_iter().map(Into::into).collect())
    }

    /// Drop the given header names
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(names.into_iter().map(Into::into).collect())
    }

    /// Drop the `authorization` header
    pub fn exclude_authorization() -> Self {
        Self::exclude([AUTHORIZATION])
    }

    /// Build a filter from optional include and exclude lists
    ///
    /// At most one list may be non-empty. With neither set the default
    /// [`HeaderFilter::exclude_authorization`] applies.
    pub fn from_lists(include: &[String], exclude: &[String]) -> Result<Self, DomainError> {
        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => Err(DomainError::InvalidHeaderFilter(
                "include and exclude lists are mutually exclusive".to_string(),
            )),
            (false, true) => Ok(Self::include(include.iter().cloned())),
            (true, false) => Ok(Self::exclude(exclude.iter().cloned())),
            (true, true) => Ok(Self::default()),
        }
    }

    /// Whether a header with this name passes the filter
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::Include(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
            Self::Exclude(names) => !names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }

    /// Produce a new collection holding only the allowed headers
    #[must_use]
    pub fn filter(&self, headers: &Headers) -> Headers {
        headers.retain_names(|name| self.allows(name))
    }
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::exclude_authorization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Headers {
        Headers::new()
            .with("Authorization", "Bearer token")
            .with("Accept", "*/*")
            .with("X-Request-Id", "abc")
    }

    #[test]
    fn default_excludes_authorization() {
        let filtered = HeaderFilter::default().filter(&sample());
        assert!(!filtered.contains("Authorization"));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn exclude_matches_case_insensitively() {
        let filtered = HeaderFilter::exclude(["ACCEPT", "x-request-id"]).filter(&sample());
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains("authorization"));
    }

    #[test]
    fn include_keeps_only_listed() {
        let filtered = HeaderFilter::include(["x-REQUEST-id"]).filter(&sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn empty_include_drops_everything() {
        let filtered = HeaderFilter::include(Vec::<String>::new()).filter(&sample());
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_leaves_input_untouched() {
        let headers = sample();
        let _ = HeaderFilter::exclude_authorization().filter(&headers);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn from_lists_rejects_both() {
        let both = HeaderFilter::from_lists(&["a".into()], &["b".into()]);
        assert!(matches!(both, Err(DomainError::InvalidHeaderFilter(_))));
        assert_eq!(
            HeaderFilter::from_lists(&[], &[]).unwrap(),
            HeaderFilter::exclude_authorization()
        );
        assert_eq!(
            HeaderFilter::from_lists(&["accept".into()], &[]).unwrap(),
            HeaderFilter::include(["accept"])
        );
    }

    #[test]
    fn deserializes_from_tagged_form() {
        let filter: HeaderFilter =
            serde_json::from_str(r#"{"mode":"include","names":["accept"]}"#).unwrap();
        assert_eq!(filter, HeaderFilter::include(["accept"]));
    }
}
