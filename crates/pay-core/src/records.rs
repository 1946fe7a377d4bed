//! # Gateway Records
//!
//! Orders, payments, plans and subscriptions as the gateway returns them,
//! plus the request bodies sent to create orders and subscriptions.
//!
//! The relay only reads a handful of fields. Everything else the gateway
//! sends is kept in `extra` so records echo back to callers unchanged.

use crate::plan::{Currency, Period};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Billing cycles requested for a new subscription
pub const DEFAULT_TOTAL_COUNT: u32 = 12;

/// Order creation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Amount in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
    /// Correlation tag (generated)
    pub receipt: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

impl OrderRequest {
    /// Create an order request from a major-unit amount with a generated receipt
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
            receipt: format!("receipt_{}", Uuid::new_v4().simple()),
            notes: BTreeMap::new(),
        }
    }

    /// Set receipt
    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = receipt.into();
        self
    }

    /// Add a note
    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// Subscription creation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRequest {
    pub plan_id: String,
    pub total_count: u32,
    pub quantity: u32,
    /// 0 = the merchant notifies the customer, 1 = the gateway does
    pub customer_notify: u8,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

impl SubscriptionRequest {
    pub fn new(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            total_count: DEFAULT_TOTAL_COUNT,
            quantity: 1,
            customer_notify: 0,
            notes: BTreeMap::new(),
        }
    }
}

/// A gateway order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A gateway payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Item block of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: i64,
    pub currency: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A gateway subscription plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub period: Period,
    pub interval: u32,
    pub item: PlanItem,
    /// `[]` when empty, an object otherwise
    #[serde(default)]
    pub notes: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A gateway subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub current_start: Option<i64>,
    #[serde(default)]
    pub current_end: Option<i64>,
    #[serde(default)]
    pub charge_at: Option<i64>,
    #[serde(default)]
    pub notes: Value,
    /// Display name of the plan, filled in by the relay when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    /// Plan id, if the gateway reported a non-empty one
    pub fn plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Paged list wrapper used by the gateway's list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
