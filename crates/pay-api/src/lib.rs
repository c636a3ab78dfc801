//! # pay-api
//!
//! HTTP API layer for razorpay-cart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Order creation and payment verification endpoints
//! - Webhook handler for Razorpay events
//! - Static hosting of the checkout page
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/create-order` | Create a Razorpay order |
//! | POST | `/verify-payment` | Verify a checkout signature |
//! | POST | `/webhook` | Razorpay webhook |
//! | GET | `/*` | Files from `STATIC_DIR` |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat, OrderPolicy};
