//! # Razorpay REST Client
//!
//! `PaymentGateway` implementation over the Razorpay v1 REST API.
//! Requests authenticate with HTTP Basic (`key_id:key_secret`).

use crate::config::RazorpayConfig;
use async_trait::async_trait;
use pay_core::{
    validate_entity_id, Collection, GatewayOrder, OrderRequest, PaymentError, PaymentGateway,
    PaymentRecord, PaymentResult, Plan, PlanRequest, Subscription, SubscriptionRequest,
};
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "razorpay";

/// Razorpay gateway client
///
/// Holds credentials and a pooled HTTP client; safe to share behind an `Arc`.
#[derive(Debug)]
pub struct RazorpayClient {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayClient {
    /// Create a new client
    pub fn new(config: RazorpayConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(RazorpayConfig::from_env()?)
    }

    /// Key id, as handed to the checkout widget
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.config.key_id,
            Some(self.config.key_secret.expose_secret()),
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PaymentResult<T> {
        debug!("GET {}", path);
        let request = self.authorized(self.client.get(self.url(path)));
        self.send(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PaymentResult<T> {
        debug!("POST {}", path);
        let request = self.authorized(self.client.post(self.url(path))).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            // Parse Razorpay error
            if let Ok(error_response) = serde_json::from_str::<RazorpayErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.describe(),
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Razorpay response: {}", e))
        })
    }
}

fn checked_id<'a>(kind: &str, id: &'a str) -> PaymentResult<&'a str> {
    if validate_entity_id(id) {
        Ok(id)
    } else {
        Err(PaymentError::InvalidRequest(format!(
            "Invalid {} id: {:?}",
            kind, id
        )))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self, request), fields(amount = request.amount, receipt = %request.receipt))]
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<GatewayOrder> {
        let order: GatewayOrder = self.post("orders", request).await?;
        info!("Created Razorpay order: id={}", order.id);
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<PaymentRecord> {
        let id = checked_id("payment", payment_id)?;
        self.get(&format!("payments/{}", id)).await
    }

    #[instrument(
        skip(self, request),
        fields(period = request.period.as_str(), amount = request.item.amount)
    )]
    async fn create_plan(&self, request: &PlanRequest) -> PaymentResult<Plan> {
        let plan: Plan = self.post("plans", request).await?;
        info!("Created Razorpay plan: id={}, name={}", plan.id, plan.item.name);
        Ok(plan)
    }

    #[instrument(skip(self))]
    async fn fetch_plan(&self, plan_id: &str) -> PaymentResult<Plan> {
        let id = checked_id("plan", plan_id)?;
        self.get(&format!("plans/{}", id)).await
    }

    #[instrument(skip(self))]
    async fn list_plans(&self) -> PaymentResult<Vec<Plan>> {
        let plans: Collection<Plan> = self.get("plans").await?;
        debug!("Fetched {} plans", plans.items.len());
        Ok(plans.items)
    }

    #[instrument(skip(self, request), fields(plan_id = %request.plan_id))]
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> PaymentResult<Subscription> {
        checked_id("plan", &request.plan_id)?;
        let subscription: Subscription = self.post("subscriptions", request).await?;
        info!(
            "Created Razorpay subscription: id={}, status={}",
            subscription.id, subscription.status
        );
        Ok(subscription)
    }

    #[instrument(skip(self))]
    async fn fetch_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        let id = checked_id("subscription", subscription_id)?;
        self.get(&format!("subscriptions/{}", id)).await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> PaymentResult<Subscription> {
        let id = checked_id("subscription", subscription_id)?;
        let body = CancelRequest {
            cancel_at_cycle_end: u8::from(at_cycle_end),
        };
        let subscription: Subscription = self
            .post(&format!("subscriptions/{}/cancel", id), &body)
            .await?;
        info!(
            "Cancelled Razorpay subscription: id={}, status={}",
            subscription.id, subscription.status
        );
        Ok(subscription)
    }

    #[instrument(skip(self))]
    async fn list_subscriptions(&self) -> PaymentResult<Vec<Subscription>> {
        let subscriptions: Collection<Subscription> = self.get("subscriptions").await?;
        debug!("Fetched {} subscriptions", subscriptions.items.len());
        Ok(subscriptions.items)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CancelRequest {
    cancel_at_cycle_end: u8,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl RazorpayError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{}: {}", code, description),
            (None, Some(description)) => description.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}
