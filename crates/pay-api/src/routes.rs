//! # Routes
//!
//! Axum router configuration for the relay API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Payments:
///   - POST /payment/initiate - Create gateway order
///   - POST /payment-verify - Verify checkout payment signature
///
/// - Subscriptions:
///   - POST /subscription-verify - Verify subscription payment signature
///   - POST /subscription/create-plan - Create plan
///   - GET  /subscription/plans - List plans
///   - POST /subscription/create - Create subscription
///   - POST /subscription/cancel - Cancel subscription
///   - GET  /subscription/active - List subscriptions
///   - GET  /subscription/{id} - Fetch subscription with plan name
///
/// - Webhooks:
///   - POST /webhook - Razorpay webhook handler (raw body)
///
/// - Contact form:
///   - POST /formapi - Append name and email to the spreadsheet
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new().route("/initiate", post(handlers::initiate_payment));

    // Static segments win over `{id}` in the matcher
    let subscription_routes = Router::new()
        .route("/create-plan", post(handlers::create_plan))
        .route("/plans", get(handlers::list_plans))
        .route("/create", post(handlers::create_subscription))
        .route("/cancel", post(handlers::cancel_subscription))
        .route("/active", get(handlers::list_active_subscriptions))
        .route("/{id}", get(handlers::get_subscription));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/payment-verify", post(handlers::verify_payment))
        .route("/subscription-verify", post(handlers::verify_subscription))
        .route("/webhook", post(handlers::razorpay_webhook))
        .route("/formapi", post(handlers::submit_form))
        .nest("/payment", payment_routes)
        .nest("/subscription", subscription_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
