//! # Payment Gateway Trait
//!
//! Seam between the HTTP layer and a payment provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentGateway (trait)                    │
//! │  ├── create_order()                                         │
//! │  ├── verify_payment()                                       │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │RazorpayGateway│
//!                    └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::order::{Order, OrderRequest, PaymentVerification, VerificationOutcome, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order with the provider.
    ///
    /// Performs exactly one outbound call and returns the provider's order.
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<Order>;

    /// Check the signature the checkout widget returned for a payment.
    ///
    /// A mismatch is reported as [`VerificationOutcome::SignatureMismatch`],
    /// not as an error.
    fn verify_payment(&self, verification: &PaymentVerification) -> VerificationOutcome;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
