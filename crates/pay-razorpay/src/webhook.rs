//! # Razorpay Webhook Handling
//!
//! Parsing and dispatch of Razorpay webhook events.
//! Signature checks happen before anything in this module sees the body.

use chrono::{DateTime, Utc};
use pay_core::{PaymentError, PaymentResult, WebhookEvent, WebhookEventType};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Header carrying the hex HMAC of the raw body
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Header carrying the unique delivery id
pub const EVENT_ID_HEADER: &str = "x-razorpay-event-id";

/// Events that should be enabled in the Razorpay Dashboard for full functionality
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "payment.authorized",
    "payment.captured",
    "payment.failed",
    "order.paid",
    "refund.created",
    "refund.processed",
    "refund.failed",
];

/// Map a Razorpay event name to our event type
pub fn event_type_from_name(name: &str) -> WebhookEventType {
    match name {
        "payment.authorized" => WebhookEventType::PaymentAuthorized,
        "payment.captured" => WebhookEventType::PaymentCaptured,
        "payment.failed" => WebhookEventType::PaymentFailed,
        "order.paid" => WebhookEventType::OrderPaid,
        "refund.created" => WebhookEventType::RefundCreated,
        "refund.processed" => WebhookEventType::RefundProcessed,
        "refund.failed" => WebhookEventType::RefundFailed,
        other => WebhookEventType::Unknown(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayWebhookEnvelope {
    event: String,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    contains: Vec<String>,
    #[serde(default)]
    payload: Map<String, Value>,
    #[serde(default)]
    created_at: Option<i64>,
}

/// `payload.<name>.entity`, if present
fn entity<'a>(payload: &'a Map<String, Value>, name: &str) -> Option<&'a Map<String, Value>> {
    payload
        .get(name)
        .and_then(|e| e.get("entity"))
        .and_then(Value::as_object)
}

fn str_field(obj: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Parse a webhook body whose signature has already been verified
pub fn parse_webhook_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let envelope: RazorpayWebhookEnvelope = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Parsed Razorpay webhook: event={}", envelope.event);

    let payment = entity(&envelope.payload, "payment");
    let order = entity(&envelope.payload, "order");
    let refund = entity(&envelope.payload, "refund");

    // Payment-level fields win; refunds and orders fill the gaps
    let primary = payment.or(refund).or(order);

    let payment_id = payment
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| str_field(refund, "payment_id"));

    let order_id = str_field(payment, "order_id").or_else(|| str_field(order, "id"));

    let amount = primary
        .and_then(|e| e.get("amount"))
        .and_then(Value::as_i64);

    let timestamp = envelope
        .created_at
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(WebhookEvent {
        event_id: None,
        event_type: event_type_from_name(&envelope.event),
        provider: "razorpay".to_string(),
        account_id: envelope.account_id,
        contains: envelope.contains,
        payment_id,
        order_id,
        amount,
        currency: str_field(primary, "currency"),
        status: str_field(primary, "status"),
        method: str_field(payment, "method"),
        email: str_field(payment, "email"),
        error_description: str_field(primary, "error_description"),
        raw_data: Some(Value::Object(envelope.payload)),
        timestamp,
    })
}

/// Webhook event handler trait
///
/// Implement this trait to act on verified events. Every method defaults
/// to logging.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment is authorized but not yet captured
    fn on_payment_authorized(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment authorized: payment={:?}, order={:?}",
            event.payment_id, event.order_id
        );
        Ok(())
    }

    /// Called when a payment is captured
    fn on_payment_captured(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment captured: payment={:?}, order={:?}, amount={:?}",
            event.payment_id, event.order_id, event.amount
        );
        Ok(())
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!(
            "Payment failed: payment={:?}, reason={:?}",
            event.payment_id, event.error_description
        );
        Ok(())
    }

    /// Called when an order is fully paid
    fn on_order_paid(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Order paid: order={:?}", event.order_id);
        Ok(())
    }

    /// Called for refund.created / refund.processed / refund.failed
    fn on_refund(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Refund event {:?}: payment={:?}, amount={:?}",
            event.event_type, event.payment_id, event.amount
        );
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {:?}", event.event_type);
        Ok(())
    }
}

/// Default no-op webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentAuthorized => handler.on_payment_authorized(event),
        WebhookEventType::PaymentCaptured => handler.on_payment_captured(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::OrderPaid => handler.on_order_paid(event),
        WebhookEventType::RefundCreated
        | WebhookEventType::RefundProcessed
        | WebhookEventType::RefundFailed => handler.on_refund(event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(event),
    }
}
