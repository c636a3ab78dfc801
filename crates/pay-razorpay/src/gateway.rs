//! # Razorpay Gateway
//!
//! Orders API client plus checkout and webhook signature checks.
//! Order creation is the only operation that talks to Razorpay.

use crate::config::RazorpayConfig;
use crate::webhook::parse_webhook_event;
use async_trait::async_trait;
use pay_core::{
    verify_payment_signature, verify_webhook_signature, Order, OrderRequest, PaymentError,
    PaymentGateway, PaymentResult, PaymentVerification, VerificationOutcome, WebhookEvent,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "razorpay";

/// Razorpay payment gateway
pub struct RazorpayGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayGateway {
    /// Create a new gateway with its own HTTP client
    pub fn new(config: RazorpayConfig) -> PaymentResult<Self> {
        if config.timeout.is_zero() {
            return Err(PaymentError::Configuration(
                "Razorpay timeout must be greater than zero".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self, request), fields(receipt = %request.receipt, amount = request.amount))]
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<Order> {
        let url = self.config.orders_url();

        debug!(
            "Creating Razorpay order: amount={}, currency={}, payment_capture={}",
            request.amount, request.currency, request.payment_capture
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<RazorpayErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.to_string(),
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let order: Order = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Razorpay order: {}", e))
        })?;

        info!(
            "Created Razorpay order: id={}, amount={}, status={:?}",
            order.id,
            order.amount,
            order.status()
        );

        Ok(order)
    }

    #[instrument(skip(self, verification), fields(order_id = %verification.order_id, payment_id = %verification.payment_id))]
    fn verify_payment(&self, verification: &PaymentVerification) -> VerificationOutcome {
        if verify_payment_signature(
            &self.config.key_secret,
            &verification.order_id,
            &verification.payment_id,
            &verification.signature,
        ) {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::SignatureMismatch
        }
    }

    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        if !verify_webhook_signature(&self.config.webhook_secret, payload, signature) {
            return Err(PaymentError::WebhookVerificationFailed(
                "Signature mismatch".to_string(),
            ));
        }

        parse_webhook_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    field: Option<String>,
}

impl std::fmt::Display for RazorpayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = self.description.as_deref().unwrap_or("unknown error");
        match (&self.code, &self.field) {
            (Some(code), Some(field)) => write!(f, "{} ({}, field {})", description, code, field),
            (Some(code), None) => write!(f, "{} ({})", description, code),
            _ => f.write_str(description),
        }
    }
}
