//! Application services - Use case implementations

mod fault_classifier;
pub mod record_builder;
mod telemetry_pipeline;

pub use fault_classifier::{ClassifierChain, ExceptionHandler, FaultClassifier};
pub use record_builder::{ErrorRecordBuilder, RequestRecordBuilder, ResponseRecordBuilder};
pub use telemetry_pipeline::{
    ApiErrorEnvelope, CAPTURE_FAILURES_METRIC, CaptureState, INTERNAL_SERVER_ERROR_MESSAGE,
    MISSING_MESSAGE_PLACEHOLDER, ObservedCall, RecordKind, TelemetryPipeline,
};
