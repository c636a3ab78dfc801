//! # Request Handlers
//!
//! Axum request handlers for order creation, payment verification and
//! Razorpay webhooks. Bodies arrive as raw bytes and are parsed here so
//! every rejection carries this API's own error shape.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use pay_core::{Order, OrderRequest, PaymentError, PaymentVerification, VerificationOutcome};
use pay_razorpay::{dispatch_webhook_event, EVENT_ID_HEADER, SIGNATURE_HEADER};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create order request
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Amount in major units (rupees). Falls back to the configured amount.
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Fields posted by the checkout widget's success handler
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

impl VerifyPaymentRequest {
    /// All three fields, if every one is present and non-empty
    pub fn into_verification(self) -> Option<PaymentVerification> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(PaymentVerification::new(
            present(self.razorpay_order_id)?,
            present(self.razorpay_payment_id)?,
            present(self.razorpay_signature)?,
        ))
    }
}

/// Verify payment response
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl VerifyPaymentResponse {
    fn verified() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    fn rejected(reason: &'static str) -> Self {
        Self {
            verified: false,
            error: Some(reason),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse::new(error, status.as_u16()).with_details(details)),
    )
}

/// Parse a JSON body; an empty body reads as the type's default
fn parse_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "razorpay-cart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a provider order
#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Order>, ApiError> {
    let request: CreateOrderRequest = parse_json_body(&body).map_err(|e| {
        debug!("Rejected create-order body: {}", e);
        api_error(StatusCode::BAD_REQUEST, "invalid_request", e.to_string())
    })?;

    let policy = &state.config.orders;
    let price = policy.price_for(request.amount).map_err(|e| {
        debug!("Rejected order amount {:?}: {}", request.amount, e);
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        api_error(status, e.reason(), e.to_string())
    })?;

    let order_request = OrderRequest::new(price, policy.capture_mode);

    info!(
        "Creating order: amount={}, receipt={}, provider={}",
        price.display(),
        order_request.receipt,
        state.gateway.provider_name()
    );

    let order = state
        .gateway
        .create_order(&order_request)
        .await
        .map_err(|e| {
            error!(retryable = e.is_retryable(), "Order creation failed: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "order_creation_failed",
                e.to_string(),
            )
        })?;

    info!("Created order: {}", order.id);

    Ok(Json(order))
}

/// Verify the signature returned by the checkout widget
#[instrument(skip(state, body))]
pub async fn verify_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<VerifyPaymentResponse>) {
    let request: VerifyPaymentRequest = match parse_json_body(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected verify-payment body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(VerifyPaymentResponse::rejected("invalid_request")),
            );
        }
    };

    let Some(verification) = request.into_verification() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyPaymentResponse::rejected("missing_parameters")),
        );
    };

    match state.gateway.verify_payment(&verification) {
        VerificationOutcome::Verified => {
            // Settling the payment in a store would happen here
            info!("Payment verified: {}", verification.payment_id);
            (StatusCode::OK, Json(VerifyPaymentResponse::verified()))
        }
        VerificationOutcome::SignatureMismatch => {
            warn!(
                "Signature mismatch: order={}, payment={}",
                verification.order_id, verification.payment_id
            );
            (
                StatusCode::OK,
                Json(VerifyPaymentResponse::rejected("signature_mismatch")),
            )
        }
    }
}

/// Handle Razorpay webhook. The body must stay as raw bytes until verified.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Webhook without {} header", SIGNATURE_HEADER);
        return (StatusCode::BAD_REQUEST, "invalid signature");
    };

    let mut event = match state.gateway.verify_webhook(&body, signature).await {
        Ok(event) => event,
        Err(PaymentError::WebhookVerificationFailed(reason)) => {
            warn!("Webhook signature mismatch: {}", reason);
            return (StatusCode::BAD_REQUEST, "invalid signature");
        }
        Err(PaymentError::WebhookParseError(reason)) => {
            warn!("Webhook payload rejected: {}", reason);
            return (StatusCode::BAD_REQUEST, "invalid payload");
        }
        Err(e) => {
            error!("Webhook verification error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    event.event_id = headers
        .get(EVENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    info!(
        "Webhook event: type={:?}, id={:?}",
        event.event_type, event.event_id
    );

    // Deliveries are not deduplicated; a redelivered event is handled again
    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), &event) {
        error!("Webhook handler error: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "handler error");
    }

    (StatusCode::OK, "ok")
}
