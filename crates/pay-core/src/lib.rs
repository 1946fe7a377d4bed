//! # pay-core
//!
//! Core types and traits for the razorpay-relay payment service.
//!
//! This crate provides:
//! - `PaymentGateway` trait, the injected seam to the hosted gateway
//! - `PlanDraft` and `PlanRequest` for shaping subscription plans
//! - `Currency` and `Period` for money and billing cycles
//! - Gateway record types (`Plan`, `Subscription`, `PaymentRecord`, ...)
//! - `SheetsClient` trait for the contact-form spreadsheet bridge
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{PlanDraft, PlanRequest, PaymentGateway};
//!
//! let draft = PlanDraft::new("Pro", 499.0).with_interval("month", Some(1));
//! let request = PlanRequest::from_draft(&draft)?;
//!
//! // amount is now 49900 paise
//! let plan = gateway.create_plan(&request).await?;
//! ```

pub mod error;
pub mod gateway;
pub mod plan;
pub mod records;
pub mod sheets;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use gateway::{validate_entity_id, BoxedGateway, PaymentGateway};
pub use plan::{
    validate_amount, Currency, Period, PlanDraft, PlanItemRequest, PlanRequest, MAX_AMOUNT,
    TEST_PLAN_AMOUNT,
};
pub use records::{
    Collection, GatewayOrder, OrderRequest, PaymentRecord, Plan, PlanItem, Subscription,
    SubscriptionRequest, DEFAULT_TOTAL_COUNT,
};
pub use sheets::{BoxedSheetsClient, FormSubmission, SheetsClient};
