//! # pay-razorpay
//!
//! Razorpay gateway integration for razorpay-relay-rs.
//!
//! This crate provides:
//!
//! 1. **RazorpayClient** - `PaymentGateway` over the Razorpay REST API
//!    - Orders, payments, plans, subscriptions
//!    - Basic auth with the key id / key secret pair
//!
//! 2. **SignatureVerifier** - HMAC-SHA256 signature checks
//!    - Checkout payment callbacks (`order_id|payment_id`)
//!    - Subscription payment callbacks (`payment_id|subscription_id`)
//!    - Webhooks (raw body)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_razorpay::{RazorpayClient, RazorpayConfig, SignatureVerifier};
//!
//! let config = RazorpayConfig::from_env()?;
//! let verifier = SignatureVerifier::new(config.key_secret());
//! let client = RazorpayClient::new(config)?;
//!
//! if verifier.verify_payment(&order_id, &payment_id, &signature).is_valid() {
//!     let payment = client.fetch_payment(&payment_id).await?;
//! }
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_razorpay::{dispatch_webhook_event, LoggingWebhookHandler, WebhookEvent};
//!
//! webhook_verifier.verify_webhook(&raw_body, signature).into_result()?;
//! let event = WebhookEvent::from_slice(&raw_body)?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod client;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use client::RazorpayClient;
pub use config::{webhook_secret_from_env, RazorpayConfig, DEFAULT_API_BASE_URL};
pub use signature::{RejectReason, SignatureVerifier, Verification, SIGNATURE_HEADER};
pub use webhook::{
    dispatch_webhook_event, LoggingWebhookHandler, WebhookEvent, WebhookEventType,
    WebhookHandler,
};
