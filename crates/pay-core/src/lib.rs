//! # pay-core
//!
//! Core types and traits for the razorpay-cart payment server.
//!
//! This crate provides:
//! - `PaymentGateway` trait for implementing payment providers
//! - `Currency` and `Price` for minor-unit amounts
//! - `OrderRequest`, `Order`, `PaymentVerification` and `WebhookEvent`
//! - HMAC-SHA256 signature helpers with constant-time comparison
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CaptureMode, Currency, OrderRequest, PaymentGateway, Price};
//!
//! let price = Price::new(500.0, Currency::INR)?; // 50000 paise
//! let order = gateway.create_order(&OrderRequest::new(price, CaptureMode::Auto)).await?;
//!
//! // Hand order.id to the checkout widget
//! ```

pub mod error;
pub mod gateway;
pub mod money;
pub mod order;
pub mod signature;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use money::{Currency, Price};
pub use order::{
    receipt_for, CaptureMode, Order, OrderRequest, PaymentVerification, VerificationOutcome,
    WebhookEvent, WebhookEventType,
};
pub use signature::{
    compute_hmac_sha256, constant_time_eq, payment_signature, verify_payment_signature,
    verify_webhook_signature,
};
