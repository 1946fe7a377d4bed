//! # Payment Gateway Trait
//!
//! The seam between the HTTP handlers and the hosted payment gateway.
//!
//! Handlers never construct a gateway client themselves. A client is built
//! once at start-up and handed to them through application state, so tests
//! can substitute an in-memory fake.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentGateway (trait)                    │
//! │  ├── orders:        create_order()                          │
//! │  ├── payments:      fetch_payment()                         │
//! │  ├── plans:         create_plan() fetch_plan() list_plans() │
//! │  └── subscriptions: create / fetch / cancel / list          │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │RazorpayClient │         │  test fakes   │
//!       └───────────────┘         └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::plan::PlanRequest;
use crate::records::{
    GatewayOrder, OrderRequest, PaymentRecord, Plan, Subscription, SubscriptionRequest,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the relay forwards to the payment gateway.
///
/// Implementations are stateless credential holders: safe to share across
/// requests and never retrying on their own.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for a one-time payment.
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<GatewayOrder>;

    /// Fetch a payment by id.
    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<PaymentRecord>;

    /// Create a subscription plan.
    async fn create_plan(&self, request: &PlanRequest) -> PaymentResult<Plan>;

    /// Fetch a plan by id.
    async fn fetch_plan(&self, plan_id: &str) -> PaymentResult<Plan>;

    /// List plans.
    async fn list_plans(&self) -> PaymentResult<Vec<Plan>>;

    /// Create a subscription to a plan.
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> PaymentResult<Subscription>;

    /// Fetch a subscription by id.
    async fn fetch_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription>;

    /// Cancel a subscription, either now or when the current cycle ends.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> PaymentResult<Subscription>;

    /// List subscriptions.
    async fn list_subscriptions(&self) -> PaymentResult<Vec<Subscription>>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn PaymentGateway>;

/// Check an identifier before it is interpolated into a gateway URL path
pub fn validate_entity_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 100
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("pay_QEBlQuyBFNc2pz"));
        assert!(validate_entity_id("sub-123"));
        assert!(!validate_entity_id(""));
        assert!(!validate_entity_id("../orders"));
        assert!(!validate_entity_id("plan 1"));
        assert!(!validate_entity_id(&"a".repeat(101)));
    }
}
