//! End-to-end tests of the HTTP surface with the gateway pointed at a mock
//! Razorpay.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use pay_api::{create_router, AppConfig, AppState, OrderPolicy};
use pay_core::{
    compute_hmac_sha256, payment_signature, CaptureMode, Order, OrderRequest, PaymentGateway,
    PaymentResult, PaymentVerification, VerificationOutcome, WebhookEvent, WebhookEventType,
};
use pay_razorpay::{RazorpayConfig, RazorpayGateway, WebhookHandler};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_SECRET: &str = "s3cr3t";
const WEBHOOK_SECRET: &str = "wh_s3cr3t";

fn razorpay_gateway(base_url: &str) -> RazorpayGateway {
    let config = RazorpayConfig::new("rzp_test_abc", KEY_SECRET, WEBHOOK_SECRET)
        .with_api_base_url(base_url)
        .with_timeout(Duration::from_secs(2));
    RazorpayGateway::new(config).unwrap()
}

fn app_config() -> AppConfig {
    AppConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../public"),
        ..AppConfig::default()
    }
}

fn server_with(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).unwrap()
}

fn server_for(base_url: &str) -> TestServer {
    server_with(AppState::with_gateway(
        app_config(),
        Arc::new(razorpay_gateway(base_url)),
    ))
}

/// Delegates to Razorpay but counts signature checks
struct CountingGateway {
    inner: RazorpayGateway,
    verifications: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<Order> {
        self.inner.create_order(request).await
    }

    fn verify_payment(&self, verification: &PaymentVerification) -> VerificationOutcome {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_payment(verification)
    }

    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        self.inner.verify_webhook(payload, signature).await
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<WebhookEvent>>,
}

impl WebhookHandler for RecordingHandler {
    fn on_payment_captured(&self, event: &WebhookEvent) -> PaymentResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn provider_order(amount: i64) -> Value {
    json!({
        "id": "order_EKwxwAgItmmXdp",
        "entity": "order",
        "amount": amount,
        "amount_paid": 0,
        "amount_due": amount,
        "currency": "INR",
        "receipt": "rcpt_1700000000000",
        "status": "created",
        "attempts": 0,
        "notes": [],
        "created_at": 1582628071
    })
}

// =============================================================================
// Health & static
// =============================================================================

#[tokio::test]
async fn health_reports_service() {
    let server = server_for("http://127.0.0.1:9");

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "razorpay-cart");
}

#[tokio::test]
async fn checkout_page_is_served_from_static_dir() {
    let server = server_for("http://127.0.0.1:9");

    let response = server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("/create-order"));

    assert_eq!(
        server.get("/missing.js").await.status_code(),
        StatusCode::NOT_FOUND
    );
}

// =============================================================================
// POST /create-order
// =============================================================================

#[tokio::test]
async fn create_order_converts_client_amount_to_paise() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(basic_auth("rzp_test_abc", KEY_SECRET))
        .and(body_partial_json(json!({
            "amount": 1000,
            "currency": "INR",
            "payment_capture": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_order(1000)))
        .expect(1)
        .mount(&mock)
        .await;

    let server = server_for(&mock.uri());
    let response = server
        .post("/create-order")
        .json(&json!({ "amount": 10.00 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), provider_order(1000));
}

#[tokio::test]
async fn create_order_without_amount_uses_fallback() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_partial_json(json!({ "amount": 50000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_order(50000)))
        .expect(2)
        .mount(&mock)
        .await;

    let server = server_for(&mock.uri());

    let empty_object = server.post("/create-order").json(&json!({})).await;
    assert_eq!(empty_object.status_code(), StatusCode::OK);

    let no_body = server.post("/create-order").await;
    assert_eq!(no_body.status_code(), StatusCode::OK);
    assert_eq!(no_body.json::<Value>()["amount"], 50000);
}

#[tokio::test]
async fn create_order_ignores_client_amount_when_server_priced() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_partial_json(json!({ "amount": 50000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_order(50000)))
        .expect(1)
        .mount(&mock)
        .await;

    let config = AppConfig {
        orders: OrderPolicy {
            accept_client_amount: false,
            ..OrderPolicy::default()
        },
        ..app_config()
    };
    let server = server_with(AppState::with_gateway(
        config,
        Arc::new(razorpay_gateway(&mock.uri())),
    ));

    let response = server
        .post("/create-order")
        .json(&json!({ "amount": 1.00 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn create_order_requests_manual_capture_from_policy() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_partial_json(json!({ "amount": 50000, "payment_capture": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_order(50000)))
        .expect(1)
        .mount(&mock)
        .await;

    let config = AppConfig {
        orders: OrderPolicy {
            capture_mode: CaptureMode::Manual,
            ..OrderPolicy::default()
        },
        ..app_config()
    };
    let server = server_with(AppState::with_gateway(
        config,
        Arc::new(razorpay_gateway(&mock.uri())),
    ));

    let response = server.post("/create-order").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn create_order_rejects_bad_amounts_without_calling_provider() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_order(1)))
        .expect(0)
        .mount(&mock)
        .await;

    let server = server_for(&mock.uri());

    for amount in [json!(0), json!(-10), json!(0.001)] {
        let response = server
            .post("/create-order")
            .json(&json!({ "amount": amount }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "invalid_amount");
    }

    let unknown_field = server
        .post("/create-order")
        .json(&json!({ "amount": 10, "currency": "USD" }))
        .await;
    assert_eq!(unknown_field.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_field.json::<Value>()["error"], "invalid_request");
}

#[tokio::test]
async fn create_order_provider_failure_is_500_with_details() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "Authentication failed"
            }
        })))
        .mount(&mock)
        .await;

    let server = server_for(&mock.uri());
    let response = server.post("/create-order").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "order_creation_failed");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Authentication failed"));
}

#[tokio::test]
async fn create_order_network_failure_is_500() {
    let server = server_for("http://127.0.0.1:9");

    let response = server.post("/create-order").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "order_creation_failed");
}

// =============================================================================
// POST /verify-payment
// =============================================================================

#[tokio::test]
async fn verify_payment_accepts_precomputed_signature() {
    let server = server_for("http://127.0.0.1:9");
    let signature = compute_hmac_sha256(KEY_SECRET.as_bytes(), b"order_ABC|pay_XYZ");

    let response = server
        .post("/verify-payment")
        .json(&json!({
            "razorpay_order_id": "order_ABC",
            "razorpay_payment_id": "pay_XYZ",
            "razorpay_signature": signature
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "verified": true }));
}

#[tokio::test]
async fn verify_payment_mismatch_is_a_normal_outcome() {
    let server = server_for("http://127.0.0.1:9");
    let signature = payment_signature(KEY_SECRET, "order_ABC", "pay_XYZ");

    let response = server
        .post("/verify-payment")
        .json(&json!({
            "razorpay_order_id": "order_ABC",
            "razorpay_payment_id": "pay_XYz",
            "razorpay_signature": signature
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "verified": false, "error": "signature_mismatch" })
    );
}

#[tokio::test]
async fn verify_payment_missing_fields_skip_signature_check() {
    let gateway = Arc::new(CountingGateway {
        inner: razorpay_gateway("http://127.0.0.1:9"),
        verifications: AtomicUsize::new(0),
    });
    let server = server_with(AppState::with_gateway(app_config(), gateway.clone()));

    let bodies = [
        json!({ "razorpay_order_id": "order_ABC", "razorpay_payment_id": "pay_XYZ" }),
        json!({ "razorpay_order_id": "order_ABC", "razorpay_signature": "abc" }),
        json!({ "razorpay_payment_id": "pay_XYZ", "razorpay_signature": "abc" }),
        json!({ "razorpay_order_id": "", "razorpay_payment_id": "pay_XYZ", "razorpay_signature": "abc" }),
        json!({}),
    ];

    for body in bodies {
        let response = server.post("/verify-payment").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({ "verified": false, "error": "missing_parameters" })
        );
    }

    assert_eq!(gateway.verifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verify_payment_rejects_malformed_bodies() {
    let server = server_for("http://127.0.0.1:9");

    let unknown_field = server
        .post("/verify-payment")
        .json(&json!({
            "razorpay_order_id": "order_ABC",
            "razorpay_payment_id": "pay_XYZ",
            "razorpay_signature": "abc",
            "verified": true
        }))
        .await;
    assert_eq!(unknown_field.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_field.json::<Value>()["error"], "invalid_request");

    let not_json = server.post("/verify-payment").text("order_ABC|pay_XYZ").await;
    assert_eq!(not_json.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(not_json.json::<Value>()["verified"], false);
}

// =============================================================================
// POST /webhook
// =============================================================================

fn captured_event_body() -> &'static str {
    r#"{"entity":"event","account_id":"acc_BFQ7uQEaa7j2z7","event":"payment.captured","contains":["payment"],"payload":{"payment":{"entity":{"id":"pay_DESlfW9H8K9uqM","amount":50000,"currency":"INR","status":"captured","order_id":"order_DESlLckIVRkHWj","method":"card"}}},"created_at":1567674606}"#
}

fn signature_header() -> HeaderName {
    HeaderName::from_static("x-razorpay-signature")
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap()
}

#[tokio::test]
async fn webhook_with_valid_signature_is_acknowledged_and_dispatched() {
    let handler = Arc::new(RecordingHandler::default());
    let state = AppState::with_gateway(
        app_config(),
        Arc::new(razorpay_gateway("http://127.0.0.1:9")),
    )
    .with_webhook_handler(handler.clone());
    let server = server_with(state);

    let body = captured_event_body();
    let signature = compute_hmac_sha256(WEBHOOK_SECRET.as_bytes(), body.as_bytes());

    let response = server
        .post("/webhook")
        .add_header(signature_header(), header_value(&signature))
        .add_header(
            HeaderName::from_static("x-razorpay-event-id"),
            header_value("KbMoA3Ra8qE2Mf"),
        )
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");

    let events = handler.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, WebhookEventType::PaymentCaptured);
    assert_eq!(events[0].event_id.as_deref(), Some("KbMoA3Ra8qE2Mf"));
    assert_eq!(events[0].payment_id.as_deref(), Some("pay_DESlfW9H8K9uqM"));
}

#[tokio::test]
async fn webhook_rejects_bad_or_missing_signature() {
    let server = server_for("http://127.0.0.1:9");
    let body = captured_event_body();

    let missing = server
        .post("/webhook")
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.text(), "invalid signature");

    // Signed with the API secret instead of the webhook secret
    let wrong_key = compute_hmac_sha256(KEY_SECRET.as_bytes(), body.as_bytes());
    let response = server
        .post("/webhook")
        .add_header(signature_header(), header_value(&wrong_key))
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid signature");
}

#[tokio::test]
async fn webhook_reserialized_body_breaks_signature() {
    let server = server_for("http://127.0.0.1:9");
    let body = captured_event_body();
    let signature = compute_hmac_sha256(WEBHOOK_SECRET.as_bytes(), body.as_bytes());

    // Parse-then-stringify reorders keys and changes whitespace
    let parsed: Value = serde_json::from_str(body).unwrap();
    let reserialized = serde_json::to_string_pretty(&parsed).unwrap();
    assert_ne!(reserialized, body);

    let response = server
        .post("/webhook")
        .add_header(signature_header(), header_value(&signature))
        .bytes(Bytes::from(reserialized))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid signature");
}

#[tokio::test]
async fn webhook_signed_garbage_is_invalid_payload() {
    let server = server_for("http://127.0.0.1:9");
    let body = "not an event";
    let signature = compute_hmac_sha256(WEBHOOK_SECRET.as_bytes(), body.as_bytes());

    let response = server
        .post("/webhook")
        .add_header(signature_header(), header_value(&signature))
        .text(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid payload");
}

struct FailingHandler;

impl WebhookHandler for FailingHandler {
    fn on_payment_captured(&self, _event: &WebhookEvent) -> PaymentResult<()> {
        Err(pay_core::PaymentError::Internal("ledger unavailable".into()))
    }
}

#[tokio::test]
async fn webhook_handler_failure_is_500() {
    let state = AppState::with_gateway(
        app_config(),
        Arc::new(razorpay_gateway("http://127.0.0.1:9")),
    )
    .with_webhook_handler(Arc::new(FailingHandler));
    let server = server_with(state);

    let body = captured_event_body();
    let signature = compute_hmac_sha256(WEBHOOK_SECRET.as_bytes(), body.as_bytes());

    let response = server
        .post("/webhook")
        .add_header(signature_header(), header_value(&signature))
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "handler error");
}
