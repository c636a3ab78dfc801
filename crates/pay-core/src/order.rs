//! # Order Types
//!
//! Order, payment verification and webhook event types for razorpay-cart.

use crate::money::{Currency, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// When funds are captured after the customer authorizes a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Captured automatically at authorization
    #[default]
    Auto,
    /// Requires a separate capture call
    Manual,
}

impl CaptureMode {
    /// Provider flag value (`1` = auto, `0` = manual)
    pub fn as_flag(&self) -> u8 {
        match self {
            CaptureMode::Auto => 1,
            CaptureMode::Manual => 0,
        }
    }

    /// Parse `auto`/`manual` (also accepts `1`/`0`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "1" => Some(CaptureMode::Auto),
            "manual" | "0" => Some(CaptureMode::Manual),
            _ => None,
        }
    }
}

/// Body sent to the provider's order API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Amount in smallest currency unit
    pub amount: i64,

    /// ISO currency code
    pub currency: Currency,

    /// Client-generated receipt reference
    pub receipt: String,

    /// 1 = auto-capture, 0 = authorize only
    pub payment_capture: u8,
}

impl OrderRequest {
    /// Build a request with a timestamp-based receipt
    pub fn new(price: Price, capture: CaptureMode) -> Self {
        Self::with_receipt(price, capture, receipt_for(Utc::now()))
    }

    /// Build a request with an explicit receipt
    pub fn with_receipt(price: Price, capture: CaptureMode, receipt: impl Into<String>) -> Self {
        Self {
            amount: price.amount,
            currency: price.currency,
            receipt: receipt.into(),
            payment_capture: capture.as_flag(),
        }
    }
}

/// Receipt reference derived from a timestamp: `rcpt_<unix millis>`
pub fn receipt_for(at: DateTime<Utc>) -> String {
    format!("rcpt_{}", at.timestamp_millis())
}

/// An order as returned by the provider.
///
/// Only the fields this server reads are typed; everything else is kept in
/// `extra` so the order can be handed back to the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Provider-assigned order ID (`order_...`)
    pub id: String,

    /// Amount in smallest currency unit
    pub amount: i64,

    /// ISO currency code as reported by the provider
    pub currency: String,

    /// Remaining provider fields (entity, status, receipt, attempts, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Order status (`created`, `attempted`, `paid`)
    pub fn status(&self) -> Option<&str> {
        self.extra.get("status").and_then(Value::as_str)
    }
}

/// Identifiers the checkout widget hands back after a successful payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerification {
    pub order_id: String,
    pub payment_id: String,
    /// Hex-encoded HMAC-SHA256 supplied by the client
    pub signature: String,
}

impl PaymentVerification {
    pub fn new(
        order_id: impl Into<String>,
        payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            payment_id: payment_id.into(),
            signature: signature.into(),
        }
    }
}

/// Result of checking a payment signature. A mismatch is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    SignatureMismatch,
}

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Payment authorized, not yet captured
    PaymentAuthorized,
    /// Payment captured
    PaymentCaptured,
    /// Payment failed
    PaymentFailed,
    /// Order fully paid
    OrderPaid,
    /// Refund created
    RefundCreated,
    /// Refund processed
    RefundProcessed,
    /// Refund failed
    RefundFailed,
    /// Unknown event (passthrough)
    Unknown(String),
}

/// A verified and parsed webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Delivery ID from provider (if sent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event type
    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Merchant account the event belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Entities contained in the payload (e.g. `["payment"]`)
    #[serde(default)]
    pub contains: Vec<String>,

    /// Related payment ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Related order ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Amount (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    /// Currency code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Entity status (`captured`, `failed`, `paid`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Payment method (`card`, `upi`, `netbanking`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Customer email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Failure reason for failed payments/refunds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Raw `payload` object (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}
