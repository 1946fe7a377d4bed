//! # Razorpay Webhook Handling
//!
//! Parsing and dispatch of webhook notifications. Verify the raw body with
//! [`SignatureVerifier::verify_webhook`](crate::SignatureVerifier::verify_webhook)
//! before calling [`WebhookEvent::from_slice`].

use pay_core::{PaymentError, PaymentRecord, PaymentResult};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Webhook event types the relay recognises
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentAuthorized,
    PaymentCaptured,
    PaymentFailed,
    SubscriptionActivated,
    SubscriptionCharged,
    SubscriptionCancelled,
    /// Anything else (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    pub fn parse(name: &str) -> Self {
        match name {
            "payment.authorized" => WebhookEventType::PaymentAuthorized,
            "payment.captured" => WebhookEventType::PaymentCaptured,
            "payment.failed" => WebhookEventType::PaymentFailed,
            "subscription.activated" => WebhookEventType::SubscriptionActivated,
            "subscription.charged" => WebhookEventType::SubscriptionCharged,
            "subscription.cancelled" => WebhookEventType::SubscriptionCancelled,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

/// `{"entity": {...}}` wrapper used inside webhook payloads
#[derive(Debug, Clone, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

/// Entities carried by a webhook. Only the payment is read; other
/// entities are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<EntityWrapper<PaymentRecord>>,
}

/// A parsed webhook notification
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub account_id: Option<String>,
    /// Event name, e.g. `payment.captured`
    pub event: String,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub payload: WebhookPayload,
    #[serde(default)]
    pub created_at: i64,
}

impl WebhookEvent {
    /// Parse a webhook body
    pub fn from_slice(raw_body: &[u8]) -> PaymentResult<Self> {
        serde_json::from_slice(raw_body).map_err(|e| {
            PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
        })
    }

    pub fn event_type(&self) -> WebhookEventType {
        WebhookEventType::parse(&self.event)
    }

    /// Payment entity, if the event carries one
    pub fn payment(&self) -> Option<&PaymentRecord> {
        self.payload.payment.as_ref().map(|w| &w.entity)
    }
}

/// Webhook event handler trait
///
/// Only `payment.captured` has a dedicated hook. Everything else lands in
/// `on_unhandled_event`.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment is captured
    fn on_payment_captured(&self, payment: &PaymentRecord) -> PaymentResult<()> {
        info!(
            "Payment captured: id={}, order={:?}, amount={:?}",
            payment.id, payment.order_id, payment.amount
        );
        Ok(())
    }

    /// Called for every other event
    fn on_unhandled_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {}", event.event);
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> PaymentResult<()> {
    match event.event_type() {
        WebhookEventType::PaymentCaptured => {
            let payment = event.payment().ok_or_else(|| {
                warn!("payment.captured without a payment entity");
                PaymentError::WebhookParseError("Missing payment entity".to_string())
            })?;
            handler.on_payment_captured(payment)
        }
        _ => handler.on_unhandled_event(event),
    }
}
