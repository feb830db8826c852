//! Capture settings: which headers end up in stored records.

use domain::{DomainError, HeaderFilter};
use serde::{Deserialize, Serialize};

/// Header capture configuration
///
/// Set at most one of the two lists. With neither set, everything except
/// `Authorization` is captured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture only these headers
    #[serde(default)]
    pub include_headers: Vec<String>,

    /// Capture everything except these headers
    #[serde(default)]
    pub exclude_headers: Vec<String>,
}

impl CaptureConfig {
    /// Header filter applied to request and response headers
    pub fn header_filter(&self) -> Result<HeaderFilter, DomainError> {
        HeaderFilter::from_lists(&self.include_headers, &self.exclude_headers)
    }
}
