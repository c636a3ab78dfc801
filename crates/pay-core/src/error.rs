//! # Payment Error Types
//!
//! Typed error handling for the razorpay-cart payment server.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amount is not a positive, representable sum of money
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true if this error is worth retrying by the caller.
    ///
    /// Nothing in this server retries automatically; the flag is informational.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_) | PaymentError::ProviderError { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidAmount { .. } => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::WebhookVerificationFailed(_) => 400,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }

    /// Short machine-readable reason, used as the `error` field in responses
    pub fn reason(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "configuration_error",
            PaymentError::InvalidRequest(_) => "invalid_request",
            PaymentError::InvalidAmount { .. } => "invalid_amount",
            PaymentError::ProviderError { .. } => "provider_error",
            PaymentError::NetworkError(_) => "network_error",
            PaymentError::WebhookVerificationFailed(_) => "invalid_signature",
            PaymentError::WebhookParseError(_) => "invalid_payload",
            PaymentError::Serialization(_) => "serialization_error",
            PaymentError::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
