//! Domain layer for faultline
//!
//! Telemetry records, the transport failure taxonomy, retry decisions and the
//! value objects they are built from. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod fault;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use fault::*;
pub use value_objects::*;
