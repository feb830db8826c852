//! Integration tests for remote calls against wiremock servers
//!
//! Tests cover:
//! - Service client correlation and error payload parsing
//! - Mapping of HTTP failures onto retry decisions
//! - Classified retry with endpoint re-resolution
//! - Capturing a remote error reported by an upstream service

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{sync::Arc, time::Duration};

use application::{
    ApplicationInfo, CallContext, ClassifierChain, FaultClassifier, TelemetryPipeline,
    ports::ResolvedEndpoint,
};
use domain::{RecordId, RetryAction, RetryBudget, RetryDecision, ServiceUri, TransportFault};
use http::{Method, Uri};
use infrastructure::{
    AsyncDatabase, BackoffConfig, FaultSource, JwtClaimResolver, ServiceCallError, ServiceClient,
    ServiceClientConfig, SqliteTelemetryStore, StaticEndpointResolver, X_REQUEST_ID,
    with_classified_retry,
};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn billing() -> ServiceUri {
    ServiceUri::new("Billing", "InvoiceService").unwrap()
}

fn endpoint(server: &MockServer) -> ResolvedEndpoint {
    ResolvedEndpoint {
        service: billing(),
        address: server.uri(),
        generation: 0,
    }
}

fn fast_backoff() -> BackoffConfig {
    BackoffConfig {
        initial_delay_ms: 1,
        ..BackoffConfig::default()
    }
    .without_jitter()
}

// ============================================================================
// Service Client Tests
// ============================================================================

mod service_client_tests {
    use super::*;

    #[tokio::test]
    async fn request_includes_correlation_id() {
        let server = MockServer::start().await;
        let request_id = RecordId::new();

        Mock::given(method("GET"))
            .and(path("/invoices/42"))
            .and(header(X_REQUEST_ID, request_id.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let response = client
            .send(client.get(&endpoint(&server), "/invoices/42"), Some(request_id))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn empty_request_id_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        client
            .send(client.post(&endpoint(&server), "invoices"), Some(RecordId::EMPTY))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get(X_REQUEST_ID).is_none());
    }

    #[tokio::test]
    async fn error_status_carries_remote_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "Database unavailable",
                "messageDetail": "SqlException: timeout expired",
            })))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let err = client
            .send(client.get(&endpoint(&server), "/invoices"), None)
            .await
            .unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        let payload = err.remote_error().expect("payload");
        assert_eq!(payload.message.as_deref(), Some("Database unavailable"));
        assert_eq!(
            payload.message_detail.as_deref(),
            Some("SqlException: timeout expired")
        );
    }

    #[tokio::test]
    async fn error_status_with_plain_body_has_no_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let err = client
            .send(client.get(&endpoint(&server), "/"), None)
            .await
            .unwrap_err();
        assert!(err.remote_error().is_none());
    }
}

// ============================================================================
// Fault Classification Tests
// ============================================================================

mod classification_tests {
    use super::*;

    async fn failing_call(server: &MockServer, client: &ServiceClient) -> ServiceCallError {
        client
            .send(client.get(&endpoint(server), "/"), None)
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn server_error_retries_resolved_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let fault = failing_call(&server, &client).await.transport_fault();
        let decision = FaultClassifier::classify(&fault, &RetryBudget::default());

        assert_eq!(decision, RetryDecision::Retry {
            is_transient_endpoint_fault: true,
            max_retry_count: 10,
        });
    }

    #[tokio::test]
    async fn not_found_retries_same_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let fault = failing_call(&server, &client).await.transport_fault();
        let decision = FaultClassifier::classify(&fault, &RetryBudget::default());

        assert_eq!(decision.action(), RetryAction::Retry);
        assert!(!decision.is_transient_endpoint_fault());
    }

    #[tokio::test]
    async fn client_timeout_retries_same_endpoint_with_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = ServiceClient::with_config(
            ServiceClientConfig::default().with_timeout(Duration::from_millis(100)),
        )
        .unwrap();
        let fault = failing_call(&server, &client).await.transport_fault();
        assert_eq!(fault, TransportFault::LocalTimeout);

        let decision = FaultClassifier::classify(&fault, &RetryBudget::with_max_retries(3));
        assert_eq!(decision, RetryDecision::Retry {
            is_transient_endpoint_fault: false,
            max_retry_count: 3,
        });
    }

    #[tokio::test]
    async fn forbidden_is_unhandled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = ServiceClient::new().unwrap();
        let fault = failing_call(&server, &client).await.transport_fault();
        assert_eq!(
            ClassifierChain::new()
                .classify(&fault, &RetryBudget::default())
                .action(),
            RetryAction::Unhandled
        );
    }
}

// ============================================================================
// Classified Retry Tests
// ============================================================================

mod classified_retry_tests {
    use super::*;

    #[tokio::test]
    async fn failing_replica_is_skipped() {
        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&broken)
            .await;

        let healthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("invoice 42"))
            .expect(1)
            .mount(&healthy)
            .await;

        let resolver = StaticEndpointResolver::new()
            .with_service(billing(), [broken.uri(), healthy.uri()]);
        let client = ServiceClient::new().unwrap();

        let outcome = with_classified_retry(
            &resolver,
            &billing(),
            &ClassifierChain::new(),
            &RetryBudget::default(),
            &fast_backoff(),
            |endpoint| {
                let client = client.clone();
                async move {
                    let response = client
                        .send(client.get(&endpoint, "/invoices/42"), None)
                        .await?;
                    response.text().await.map_err(ServiceCallError::from)
                }
            },
        )
        .await;

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.re_resolutions, 1);
        assert_eq!(outcome.into_result().unwrap(), "invoice 42");
    }

    #[tokio::test]
    async fn bad_request_is_returned_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = StaticEndpointResolver::new().with_service(billing(), [server.uri()]);
        let client = ServiceClient::new().unwrap();

        let outcome = with_classified_retry(
            &resolver,
            &billing(),
            &ClassifierChain::new(),
            &RetryBudget::default(),
            &fast_backoff(),
            |endpoint| {
                let client = client.clone();
                async move { client.send(client.get(&endpoint, "/"), None).await }
            },
        )
        .await;

        assert_eq!(outcome.attempts, 1);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(
            err.decision().map(RetryDecision::action),
            Some(RetryAction::Unhandled)
        );
    }

    #[tokio::test]
    async fn not_found_exhausts_budget_on_same_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        let resolver = StaticEndpointResolver::new().with_service(billing(), [server.uri()]);
        let client = ServiceClient::new().unwrap();

        let outcome = with_classified_retry(
            &resolver,
            &billing(),
            &ClassifierChain::new(),
            &RetryBudget::with_max_retries(2),
            &fast_backoff(),
            |endpoint| {
                let client = client.clone();
                async move { client.send(client.get(&endpoint, "/"), None).await }
            },
        )
        .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.re_resolutions, 0);
        assert!(!outcome.is_ok());
    }
}

// ============================================================================
// Remote Error Capture
// ============================================================================

#[tokio::test]
async fn upstream_error_is_captured_with_its_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "Message": "Maintenance window",
        })))
        .mount(&server)
        .await;

    let db = AsyncDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let store = Arc::new(SqliteTelemetryStore::new(db.pool().clone()));
    let pipeline = TelemetryPipeline::new(
        store.clone(),
        Arc::new(JwtClaimResolver::new()),
        ApplicationInfo::new("portal", "1.0.0"),
    );

    let client = ServiceClient::new().unwrap();
    let err = client
        .send(client.get(&endpoint(&server), "/invoices"), None)
        .await
        .unwrap_err();

    let ctx = CallContext::new(Method::GET, Uri::from_static("/portal/invoices"));
    let id = pipeline
        .capture_remote_error(
            &ctx,
            err.status().unwrap(),
            &err.remote_error().cloned().unwrap_or_default(),
            &CancellationToken::new(),
        )
        .await;

    let record = store.find_error(id).await.unwrap().unwrap();
    assert_eq!(record.error_type.as_deref(), Some("ServiceUnavailable"));
    assert_eq!(record.message.as_deref(), Some("Maintenance window"));
    assert_eq!(
        record.detail.as_deref(),
        Some("Failed to parse message detail. Inner error: ")
    );
}
