//! # pay-razorpay
//!
//! Razorpay payment gateway for razorpay-cart.
//!
//! - **RazorpayGateway** creates orders through the Orders API and checks
//!   checkout signatures (`order_id|payment_id`, keyed by the API secret)
//!   and webhook signatures (raw body, keyed by the webhook secret).
//! - **webhook** parses verified event envelopes and dispatches them to a
//!   `WebhookHandler`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_razorpay::{RazorpayConfig, RazorpayGateway};
//! use pay_core::{CaptureMode, Currency, OrderRequest, PaymentGateway, Price};
//!
//! let gateway = RazorpayGateway::new(RazorpayConfig::from_env()?)?;
//! let price = Price::new(500.0, Currency::INR)?;
//! let order = gateway.create_order(&OrderRequest::new(price, CaptureMode::Auto)).await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_razorpay::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = gateway.verify_webhook(&raw_body, signature).await?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod config;
pub mod gateway;
pub mod webhook;

// Re-exports
pub use config::RazorpayConfig;
pub use gateway::RazorpayGateway;
pub use webhook::{
    dispatch_webhook_event, event_type_from_name, parse_webhook_event, LoggingWebhookHandler,
    WebhookHandler, EVENT_ID_HEADER, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
