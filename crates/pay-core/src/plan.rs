//! # Plan Types
//!
//! Currency handling and subscription plan request building.
//! Amounts come in as major units and go out to the gateway in the
//! currency's smallest unit.

use crate::error::{PaymentError, PaymentResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    SGD,
    AED,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::SGD => "SGD",
            Currency::AED => "AED",
            Currency::JPY => "JPY",
        }
    }

    /// Parse a currency code, case-insensitively
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "SGD" => Some(Currency::SGD),
            "AED" => Some(Currency::AED),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (paise, cents)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing period accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    /// Map a form interval (`day`, `week`, `month`, `year`) to a period.
    /// Anything else falls back to monthly.
    pub fn from_interval(interval: Option<&str>) -> Self {
        match interval.map(str::trim) {
            Some("day") => Period::Daily,
            Some("week") => Period::Weekly,
            Some("month") => Period::Monthly,
            Some("year") => Period::Yearly,
            _ => Period::Monthly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }
}

/// Amount charged for a test plan, in major units
pub const TEST_PLAN_AMOUNT: f64 = 1.0;

/// Largest major-unit amount accepted for orders and plans
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Check that a major-unit amount is finite, positive and at most [`MAX_AMOUNT`]
pub fn validate_amount(amount: f64) -> PaymentResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidRequest(
            "amount must be a positive number".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(PaymentError::InvalidRequest(format!(
            "amount must not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Plan as described by the caller, before gateway shaping
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub description: Option<String>,
    /// Amount in major units
    pub amount: f64,
    /// Interval keyword (`day`, `week`, `month`, `year`)
    pub interval: Option<String>,
    /// Number of periods between charges
    pub interval_count: Option<u32>,
    /// Short-cycle, one-rupee plan for exercising the flow
    pub is_test_plan: bool,
}

impl PlanDraft {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            amount,
            interval: None,
            interval_count: None,
            is_test_plan: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>, count: Option<u32>) -> Self {
        self.interval = Some(interval.into());
        self.interval_count = count;
        self
    }

    pub fn test_plan(mut self, is_test_plan: bool) -> Self {
        self.is_test_plan = is_test_plan;
        self
    }

    /// Check that the draft can be sent to the gateway
    pub fn validate(&self) -> PaymentResult<()> {
        if self.name.trim().is_empty() {
            return Err(PaymentError::missing("name"));
        }
        validate_amount(self.amount)
    }
}

/// Item block of a plan creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanItemRequest {
    pub name: String,
    pub description: String,
    /// Amount in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
}

/// Plan creation request body, as the gateway expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub period: Period,
    pub interval: u32,
    pub item: PlanItemRequest,
    pub notes: BTreeMap<String, String>,
}

impl PlanRequest {
    /// Build the gateway request for a draft, stamped with the current time
    pub fn from_draft(draft: &PlanDraft) -> PaymentResult<Self> {
        Self::from_draft_at(draft, Utc::now())
    }

    /// Build the gateway request for a draft with an explicit creation time
    pub fn from_draft_at(draft: &PlanDraft, now: DateTime<Utc>) -> PaymentResult<Self> {
        draft.validate()?;

        let currency = Currency::INR;
        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let (period, interval, item) = if draft.is_test_plan {
            (
                Period::Daily,
                1,
                PlanItemRequest {
                    name: format!("TEST: {}", draft.name),
                    description: format!(
                        "Test plan - {}",
                        description.unwrap_or("Short duration for testing")
                    ),
                    amount: currency.to_smallest_unit(TEST_PLAN_AMOUNT),
                    currency,
                },
            )
        } else {
            (
                Period::from_interval(draft.interval.as_deref()),
                draft.interval_count.filter(|c| *c > 0).unwrap_or(1),
                PlanItemRequest {
                    name: draft.name.clone(),
                    description: description.unwrap_or_default().to_string(),
                    amount: currency.to_smallest_unit(draft.amount),
                    currency,
                },
            )
        };

        let mut notes = BTreeMap::new();
        notes.insert("created_by".to_string(), "api".to_string());
        notes.insert(
            "created_at".to_string(),
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        notes.insert(
            "is_test_plan".to_string(),
            draft.is_test_plan.to_string(),
        );

        Ok(Self {
            period,
            interval,
            item,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_conversion() {
        let inr = Currency::INR;
        assert_eq!(inr.to_smallest_unit(10.0), 1000);
        assert_eq!(inr.to_smallest_unit(10.99), 1099);

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_smallest_unit(1000.0), 1000);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("inr"), Some(Currency::INR));
        assert_eq!(Currency::parse("USD"), Some(Currency::USD));
        assert_eq!(Currency::parse("xyz"), None);
        assert_eq!(serde_json::to_string(&Currency::INR).unwrap(), "\"INR\"");
    }

    #[test]
    fn test_period_mapping() {
        assert_eq!(Period::from_interval(Some("day")), Period::Daily);
        assert_eq!(Period::from_interval(Some("week")), Period::Weekly);
        assert_eq!(Period::from_interval(Some("month")), Period::Monthly);
        assert_eq!(Period::from_interval(Some("year")), Period::Yearly);
        assert_eq!(Period::from_interval(Some("fortnight")), Period::Monthly);
        assert_eq!(Period::from_interval(None), Period::Monthly);
        assert_eq!(serde_json::to_string(&Period::Weekly).unwrap(), "\"weekly\"");
    }

    #[test]
    fn test_regular_plan_request() {
        let draft = PlanDraft::new("Pro", 10.0).with_interval("week", Some(2));
        let request = PlanRequest::from_draft(&draft).unwrap();

        assert_eq!(request.period, Period::Weekly);
        assert_eq!(request.interval, 2);
        assert_eq!(request.item.name, "Pro");
        assert_eq!(request.item.description, "");
        assert_eq!(request.item.amount, 1000);
        assert_eq!(request.item.currency, Currency::INR);
        assert_eq!(request.notes.get("is_test_plan").map(String::as_str), Some("false"));
        assert_eq!(request.notes.get("created_by").map(String::as_str), Some("api"));
    }

    #[test]
    fn test_test_plan_overrides() {
        let draft = PlanDraft::new("Pro", 499.0)
            .with_interval("year", Some(3))
            .test_plan(true);
        let request = PlanRequest::from_draft(&draft).unwrap();

        assert_eq!(request.period, Period::Daily);
        assert_eq!(request.interval, 1);
        assert_eq!(request.item.name, "TEST: Pro");
        assert_eq!(request.item.description, "Test plan - Short duration for testing");
        assert_eq!(request.item.amount, 100);
        assert_eq!(request.notes.get("is_test_plan").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_zero_interval_count_defaults_to_one() {
        let draft = PlanDraft::new("Basic", 5.0).with_interval("month", Some(0));
        assert_eq!(PlanRequest::from_draft(&draft).unwrap().interval, 1);
    }

    #[test]
    fn test_created_at_note() {
        let now = DateTime::parse_from_rfc3339("2025-05-03T05:41:19.045Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = PlanRequest::from_draft_at(&PlanDraft::new("Pro", 1.0), now).unwrap();
        assert_eq!(
            request.notes.get("created_at").map(String::as_str),
            Some("2025-05-03T05:41:19.045Z")
        );
    }

    #[test]
    fn test_draft_validation() {
        assert!(matches!(
            PlanDraft::new("  ", 10.0).validate(),
            Err(PaymentError::MissingField { .. })
        ));
        assert!(matches!(
            PlanDraft::new("Pro", 0.0).validate(),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert!(PlanDraft::new("Pro", f64::NAN).validate().is_err());
        assert!(PlanDraft::new("Pro", 10.0).validate().is_ok());
    }

    #[test]
    fn test_oversized_amount_is_rejected_not_clamped() {
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount(MAX_AMOUNT + 1.0),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert!(matches!(
            PlanDraft::new("Pro", 1e300).validate(),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert!(PlanRequest::from_draft(&PlanDraft::new("Pro", 1e300)).is_err());
    }
}
