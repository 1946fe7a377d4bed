//! # pay-api
//!
//! HTTP API layer for razorpay-relay-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Signature verification endpoints for checkout and subscription payments
//! - Plan and subscription relay endpoints
//! - Webhook handler for Razorpay events
//! - Contact form bridge to Google Sheets
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/payment/initiate` | Create order |
//! | POST | `/payment-verify` | Verify checkout payment |
//! | POST | `/subscription-verify` | Verify subscription payment |
//! | POST | `/webhook` | Razorpay webhook |
//! | POST | `/subscription/create-plan` | Create plan |
//! | GET | `/subscription/plans` | List plans |
//! | POST | `/subscription/create` | Create subscription |
//! | POST | `/subscription/cancel` | Cancel subscription |
//! | GET | `/subscription/active` | List subscriptions |
//! | GET | `/subscription/{id}` | Fetch subscription |
//! | POST | `/formapi` | Append contact form row |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat};
