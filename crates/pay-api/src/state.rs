//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup and cloned into every handler; never mutated.

use anyhow::Context;
use pay_core::{BoxedPaymentGateway, CaptureMode, Currency, PaymentResult, Price};
use pay_razorpay::{LoggingWebhookHandler, RazorpayConfig, RazorpayGateway, WebhookHandler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How the server prices new orders
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPolicy {
    /// Charged when the client sends no amount (major units)
    pub fallback_amount: f64,
    /// Whether a client-supplied amount is honored at all
    pub accept_client_amount: bool,
    /// Capture mode requested from the provider
    pub capture_mode: CaptureMode,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            fallback_amount: 500.0,
            accept_client_amount: true,
            capture_mode: CaptureMode::Auto,
        }
    }
}

impl OrderPolicy {
    /// Resolve the price to charge for an optional client amount.
    ///
    /// Trusting a client amount for a real charge is unsafe; set
    /// `accept_client_amount = false` to always charge the fallback.
    pub fn price_for(&self, client_amount: Option<f64>) -> PaymentResult<Price> {
        let amount = match client_amount {
            Some(amount) if self.accept_client_amount => amount,
            Some(amount) => {
                warn!(
                    "Ignoring client-supplied amount {} (client amounts disabled)",
                    amount
                );
                self.fallback_amount
            }
            None => self.fallback_amount,
        };

        Price::new(amount, Currency::INR)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory served as the checkout frontend
    pub static_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Order pricing
    pub orders: OrderPolicy,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => 3000,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            Some("pretty") | Some("") | None => LogFormat::Pretty,
            Some(other) => anyhow::bail!("LOG_FORMAT must be pretty or json, got {:?}", other),
        };

        let mut orders = OrderPolicy::default();

        if let Some(raw) = lookup("ORDER_FALLBACK_AMOUNT") {
            orders.fallback_amount = raw.trim().parse().with_context(|| {
                format!("ORDER_FALLBACK_AMOUNT must be a number, got {:?}", raw)
            })?;
        }
        // Fail at startup rather than on the first order
        Price::new(orders.fallback_amount, Currency::INR)
            .context("ORDER_FALLBACK_AMOUNT is not a valid amount")?;

        if let Some(raw) = lookup("ORDER_ACCEPT_CLIENT_AMOUNT") {
            orders.accept_client_amount = parse_bool(&raw).with_context(|| {
                format!("ORDER_ACCEPT_CLIENT_AMOUNT must be true or false, got {:?}", raw)
            })?;
        }

        if let Some(raw) = lookup("RAZORPAY_PAYMENT_CAPTURE") {
            orders.capture_mode = CaptureMode::parse(&raw).with_context(|| {
                format!("RAZORPAY_PAYMENT_CAPTURE must be auto or manual, got {:?}", raw)
            })?;
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            log_format,
            orders,
        })
    }

    /// Address to bind to. The host may be a name; it is resolved at bind time.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            static_dir: PathBuf::from("public"),
            log_format: LogFormat::Pretty,
            orders: OrderPolicy::default(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Receives verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with a Razorpay gateway
    pub fn new(config: AppConfig, razorpay: RazorpayConfig) -> anyhow::Result<Self> {
        let gateway = RazorpayGateway::new(razorpay)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Razorpay: {}", e))?;

        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Build state around an existing gateway
    pub fn with_gateway(config: AppConfig, gateway: BoxedPaymentGateway) -> Self {
        Self {
            gateway,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            config: Arc::new(config),
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }
}
