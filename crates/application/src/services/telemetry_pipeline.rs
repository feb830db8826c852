//! Telemetry capture pipeline
//!
//! Builds request, response and error records for a call and hands them to
//! the store. A capture never fails from the caller's point of view: when
//! the record cannot be stored the pipeline logs a warning, bumps
//! `telemetry_capture_failures_total` and returns [`RecordId::EMPTY`].

use std::{fmt, future::Future, sync::Arc};

use domain::{FaultInfo, HeaderFilter, RecordId, RemoteErrorPayload, RequestRecord};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{
    application_info::ApplicationInfo,
    call_context::CallContext,
    error::ApplicationError,
    ports::{ClaimResolver, TelemetryStorePort},
    services::record_builder::{
        ErrorRecordBuilder, RequestRecordBuilder, ResponseRecordBuilder, status_name,
    },
};

/// Counter incremented for every capture that did not reach the store
pub const CAPTURE_FAILURES_METRIC: &str = "telemetry_capture_failures_total";

/// Message stored when a remote error payload has none
pub const MISSING_MESSAGE_PLACEHOLDER: &str = "Failed to parse message";

/// Message returned to clients for an unhandled error
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// Stage of a single capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Building,
    Enriching,
    Persisting,
    Committed,
    PersistFailed,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Building => "building",
            Self::Enriching => "enriching",
            Self::Persisting => "persisting",
            Self::Committed => "committed",
            Self::PersistFailed => "persist_failed",
        };
        write!(f, "{s}")
    }
}

/// Which record a capture produces; used as the metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Request,
    Response,
    Error,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Error => "error",
        }
    }
}

/// Outcome of [`TelemetryPipeline::observe`]
#[derive(Debug)]
pub struct ObservedCall {
    /// The context as the handler left it
    pub context: CallContext,
    pub request_id: RecordId,
    pub response_id: RecordId,
}

/// Body returned to a client when a call failed unexpectedly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub code: u16,
    pub message: String,
    /// Id of the stored error record, for support requests
    pub info: Option<RecordId>,
}

/// Captures and persists telemetry records for calls
pub struct TelemetryPipeline {
    store: Arc<dyn TelemetryStorePort>,
    claim_resolver: Arc<dyn ClaimResolver>,
    header_filter: HeaderFilter,
    app: ApplicationInfo,
}

impl fmt::Debug for TelemetryPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryPipeline")
            .field("header_filter", &self.header_filter)
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

impl TelemetryPipeline {
    /// Create a pipeline that excludes the `authorization` header
    pub fn new(
        store: Arc<dyn TelemetryStorePort>,
        claim_resolver: Arc<dyn ClaimResolver>,
        app: ApplicationInfo,
    ) -> Self {
        Self {
            store,
            claim_resolver,
            header_filter: HeaderFilter::default(),
            app,
        }
    }

    #[must_use]
    pub fn with_header_filter(mut self, header_filter: HeaderFilter) -> Self {
        self.header_filter = header_filter;
        self
    }

    pub const fn application(&self) -> &ApplicationInfo {
        &self.app
    }

    pub const fn header_filter(&self) -> &HeaderFilter {
        &self.header_filter
    }

    /// Capture an inbound request
    ///
    /// The body is read into the record and handed back to `ctx` unchanged.
    #[instrument(skip_all, fields(method = %ctx.method(), path = %ctx.uri().path()))]
    pub async fn capture_request(
        &self,
        ctx: &mut CallContext,
        cancel: &CancellationToken,
    ) -> RecordId {
        self.capture_request_as(ctx, None, cancel).await
    }

    /// Capture an inbound request with an explicit username
    ///
    /// `None` takes the username from the caller's `username` claim.
    pub async fn capture_request_as(
        &self,
        ctx: &mut CallContext,
        username: Option<String>,
        cancel: &CancellationToken,
    ) -> RecordId {
        let record = match self.build_request(ctx, username) {
            Ok(record) => record,
            Err(e) => {
                capture_failed(RecordKind::Request, RecordId::EMPTY, &e.to_string());
                return RecordId::EMPTY;
            },
        };
        persist(RecordKind::Request, record.id(), cancel, async {
            self.store.add_request(&record).await
        })
        .await
    }

    fn build_request(
        &self,
        ctx: &mut CallContext,
        username: Option<String>,
    ) -> Result<RequestRecord, ApplicationError> {
        let builder = RequestRecordBuilder::new(ctx, &self.app, &self.header_filter)
            .with_claim_resolver(self.claim_resolver.as_ref());
        let id = builder.record_id();
        log_state(RecordKind::Request, id, CaptureState::Building);

        log_state(RecordKind::Request, id, CaptureState::Enriching);
        Ok(builder
            .with_application_name(None)
            .with_application_version(None)
            .with_machine_name(None)
            .with_claims(None)?
            .with_username(username)?
            .with_cookies(None)
            .with_form(None)
            .with_body(None)
            .with_http_method(None)
            .with_ip_address(None)
            .with_query_string(None)
            .with_request_headers(None)
            .with_url(None)
            .build())
    }

    /// Capture the response of a call
    ///
    /// `request_id` links back to the request capture; `None` or the empty id
    /// store no link.
    #[instrument(skip_all, fields(status = ?ctx.response_status()))]
    pub async fn capture_response(
        &self,
        ctx: &CallContext,
        request_id: Option<RecordId>,
        elapsed_ms: u64,
        cancel: &CancellationToken,
    ) -> RecordId {
        let builder = ResponseRecordBuilder::new(ctx, &self.app);
        let id = builder.record_id();
        log_state(RecordKind::Response, id, CaptureState::Building);

        log_state(RecordKind::Response, id, CaptureState::Enriching);
        let record = builder
            .with_request_id(request_id)
            .with_application_name(None)
            .with_application_version(None)
            .with_machine_name(None)
            .with_http_status_code(None)
            .with_response_headers(None)
            .with_cookies(None)
            .with_elapsed_milliseconds(Some(elapsed_ms))
            .build();

        persist(RecordKind::Response, id, cancel, async {
            self.store.add_response(&record).await
        })
        .await
    }

    /// Capture a local failure that ended a call with `status`
    #[instrument(skip_all, fields(status = %status, error_type = %fault.type_name))]
    pub async fn capture_error(
        &self,
        ctx: &CallContext,
        status: StatusCode,
        fault: &FaultInfo,
        cancel: &CancellationToken,
    ) -> RecordId {
        let builder = ErrorRecordBuilder::new(ctx, &self.app, &self.header_filter);
        let id = builder.record_id();
        log_state(RecordKind::Error, id, CaptureState::Building);

        log_state(RecordKind::Error, id, CaptureState::Enriching);
        let record = builder
            .with_fault(fault)
            .with_application_name(None)
            .with_application_version(None)
            .with_machine_name(None)
            .with_all_context_properties()
            .with_http_status_code(Some(status))
            .with_all_exception_properties()
            .build();

        persist(RecordKind::Error, id, cancel, async {
            self.store.add_error(&record).await.map(|rows| rows == 1)
        })
        .await
    }

    /// Capture an error reported by an upstream service
    ///
    /// Missing payload fields are replaced with placeholder text.
    #[instrument(skip_all, fields(status = %status))]
    pub async fn capture_remote_error(
        &self,
        ctx: &CallContext,
        status: StatusCode,
        payload: &RemoteErrorPayload,
        cancel: &CancellationToken,
    ) -> RecordId {
        let builder = ErrorRecordBuilder::new(ctx, &self.app, &self.header_filter);
        let id = builder.record_id();
        log_state(RecordKind::Error, id, CaptureState::Building);

        let message = payload
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| MISSING_MESSAGE_PLACEHOLDER.to_string());
        let detail = payload
            .message_detail
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Failed to parse message detail. Inner error: {}",
                    payload.inner_error.as_deref().unwrap_or_default()
                )
            });

        log_state(RecordKind::Error, id, CaptureState::Enriching);
        let record = builder
            .with_application_name(None)
            .with_application_version(None)
            .with_machine_name(None)
            .with_all_context_properties()
            .with_http_status_code(Some(status))
            .with_type(Some(status_name(status)))
            .with_message(Some(message))
            .with_detail(Some(detail))
            .with_full_stack_trace(None)
            .build();

        persist(RecordKind::Error, id, cancel, async {
            self.store.add_error(&record).await.map(|rows| rows == 1)
        })
        .await
    }

    /// Run `handler` for a call, capturing its request before and its
    /// response after, with the handler's run time as elapsed time
    pub async fn observe<F, Fut>(
        &self,
        mut ctx: CallContext,
        cancel: &CancellationToken,
        handler: F,
    ) -> ObservedCall
    where
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = CallContext>,
    {
        let request_id = self.capture_request(&mut ctx, cancel).await;

        let started = Instant::now();
        let ctx = handler(ctx).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response_id = self
            .capture_response(&ctx, Some(request_id), elapsed_ms, cancel)
            .await;

        ObservedCall {
            context: ctx,
            request_id,
            response_id,
        }
    }

    /// Capture an unexpected failure as a 500 and build the client-facing body
    pub async fn handle_unhandled_error(
        &self,
        ctx: &CallContext,
        fault: &FaultInfo,
        cancel: &CancellationToken,
    ) -> ApiErrorEnvelope {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let id = self.capture_error(ctx, status, fault, cancel).await;
        ApiErrorEnvelope {
            code: status.as_u16(),
            message: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            info: id.non_empty(),
        }
    }
}

fn log_state(kind: RecordKind, id: RecordId, state: CaptureState) {
    debug!(record = kind.as_str(), record_id = %id, %state, "Capture state");
}

fn capture_failed(kind: RecordKind, id: RecordId, reason: &str) {
    warn!(record = kind.as_str(), record_id = %id, error = reason, "Telemetry capture failed");
    metrics::counter!(CAPTURE_FAILURES_METRIC, "record" => kind.as_str()).increment(1);
}

/// Run a store write, treating cancellation, errors and unwritten records as
/// a failed capture
async fn persist<F>(kind: RecordKind, id: RecordId, cancel: &CancellationToken, write: F) -> RecordId
where
    F: Future<Output = Result<bool, ApplicationError>>,
{
    log_state(kind, id, CaptureState::Persisting);

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApplicationError::Cancelled),
        result = write => result,
    };

    match outcome {
        Ok(true) => {
            log_state(kind, id, CaptureState::Committed);
            id
        },
        Ok(false) => {
            log_state(kind, id, CaptureState::PersistFailed);
            capture_failed(kind, id, "store did not write the record");
            RecordId::EMPTY
        },
        Err(e) => {
            log_state(kind, id, CaptureState::PersistFailed);
            capture_failed(kind, id, &e.to_string());
            RecordId::EMPTY
        },
    }
}
