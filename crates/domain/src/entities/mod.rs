//! Telemetry records - one per captured call event

use std::collections::BTreeMap;

mod error_record;
mod request_record;
mod response_record;

pub use error_record::{ErrorRecord, content_hash};
pub use request_record::RequestRecord;
pub use response_record::ResponseRecord;

/// Submitted form fields, name to values
pub type FormFields = BTreeMap<String, Vec<String>>;

/// Cookies, name to value
pub type Cookies = BTreeMap<String, String>;
