//! # razorpay-cart
//!
//! Razorpay checkout server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//! export RAZORPAY_WEBHOOK_SECRET=...
//!
//! # Run the server
//! razorpay-cart
//! ```

use anyhow::Context;
use pay_api::{routes, AppConfig, AppState, LogFormat};
use pay_razorpay::{RazorpayConfig, REQUIRED_WEBHOOK_EVENTS};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let config = AppConfig::from_env()?;

    init_tracing(config.log_format);

    let razorpay = RazorpayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load Razorpay config: {}", e))?;

    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);
    info!("Static files: {}", config.static_dir.display());
    info!(
        "Razorpay mode: {}, capture: {:?}",
        if razorpay.is_live_mode() { "live" } else { "test" },
        config.orders.capture_mode
    );
    if razorpay.is_live_mode() && !is_prod {
        warn!("Live Razorpay keys in a non-production environment");
    }

    let (host, port) = config.bind_addr();
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    let addr = listener.local_addr()?;

    let state = AppState::new(config, razorpay)?;
    info!("Payment provider: {}", state.gateway.provider_name());

    let app = routes::create_router(state);

    info!("razorpay-cart starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Orders: POST http://{}/create-order", addr);
        info!("Verify: POST http://{}/verify-payment", addr);
        info!("Webhook: POST http://{}/webhook", addr);
        info!("Webhook events: {}", REQUIRED_WEBHOOK_EVENTS.join(", "));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("razorpay-cart stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
