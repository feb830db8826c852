//! Value Objects - Immutable, identity-less domain primitives

mod claim;
mod header_filter;
mod headers;
mod record_id;
mod service_uri;

pub use claim::{Claim, USERNAME_CLAIM};
pub use header_filter::{AUTHORIZATION, HeaderFilter};
pub use headers::Headers;
pub use record_id::RecordId;
pub use service_uri::ServiceUri;
