//! # Request Handlers
//!
//! Axum request handlers for the relay API.
//! Each handler validates its input, calls the injected gateway and maps the
//! outcome to a status code and JSON envelope.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{
    validate_amount, Currency, FormSubmission, OrderRequest, PaymentError, PaymentRecord, Plan,
    PlanDraft, PlanRequest, Subscription, SubscriptionRequest,
};
use pay_razorpay::{dispatch_webhook_event, Verification, WebhookEvent, SIGNATURE_HEADER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Number as sent by browser forms: a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    pub fn value(&self, field: &str) -> Result<f64, PaymentError> {
        match self {
            NumericInput::Number(n) => Ok(*n),
            NumericInput::Text(s) => s.trim().parse().map_err(|_| {
                PaymentError::InvalidRequest(format!("{} is not a number: {:?}", field, s))
            }),
        }
    }

    /// Whole, non-negative count that fits a `u32`
    pub fn count(&self, field: &str) -> Result<u32, PaymentError> {
        let n = self.value(field)?;
        if !n.is_finite() || n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
            return Err(PaymentError::InvalidRequest(format!(
                "{} must be a whole number",
                field
            )));
        }
        Ok(n as u32)
    }
}

/// Create order request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    #[serde(default)]
    pub amount: Option<NumericInput>,
    /// ISO currency code, defaults to INR
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    /// Free-form notes stored on the order
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

/// Create order response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    pub order_id: String,
    /// Minor units, as stored by the gateway
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Checkout payment callback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpayOrderId", alias = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(default, alias = "razorpayPaymentId", alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(default, alias = "razorpaySignature", alias = "razorpay_signature")]
    pub signature: Option<String>,
}

/// Subscription payment callback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySubscriptionRequest {
    #[serde(
        default,
        alias = "razorpaySubscriptionId",
        alias = "razorpay_subscription_id"
    )]
    pub subscription_id: Option<String>,
    #[serde(default, alias = "razorpayPaymentId", alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(default, alias = "razorpaySignature", alias = "razorpay_signature")]
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub is_ok: bool,
    pub message: String,
    pub data: PaymentRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySubscriptionResponse {
    pub is_ok: bool,
    pub message: String,
    pub payment: PaymentRecord,
}

/// Failure envelope of the verification endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyFailure {
    pub is_ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<NumericInput>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub interval_count: Option<NumericInput>,
    /// `null` counts as false
    #[serde(default)]
    pub is_test_plan: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlanResponse {
    pub success: bool,
    pub plan: Plan,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionRequest {
    #[serde(
        default,
        alias = "razorpaySubscriptionId",
        alias = "razorpay_subscription_id"
    )]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelSubscriptionResponse {
    pub message: String,
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub success: bool,
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Serialize)]
pub struct PlanListResponse {
    pub plans: Vec<Plan>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Contact form submission
#[derive(Debug, Deserialize)]
pub struct FormRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub data: serde_json::Value,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(err: &PaymentError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    (status_for(&err), Json(ErrorResponse::new(err.to_string(), code)))
}

/// Upstream failures get a summary plus the gateway's message in `details`
fn relay_error(context: &str, err: PaymentError) -> ApiError {
    if !err.is_upstream() {
        return payment_error_to_response(err);
    }
    let code = err.status_code();
    (
        status_for(&err),
        Json(ErrorResponse::new(context, code).with_details(err.to_string())),
    )
}

fn rejection_to_response(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("Invalid JSON body", 400).with_details(rejection.body_text())),
    )
}

fn verify_failure(err: PaymentError, message: &str, reason: Option<&'static str>) -> Response {
    let details = match &err {
        PaymentError::MissingField { field } => Some(field.clone()),
        PaymentError::SignatureMismatch => None,
        other => Some(other.to_string()),
    };
    let body = VerifyFailure {
        is_ok: false,
        message: message.to_string(),
        reason,
        details,
    };
    (status_for(&err), Json(body)).into_response()
}

/// Present and non-blank, or a `MissingField` error
fn require(value: Option<String>, field: &str) -> Result<String, PaymentError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PaymentError::missing(field)),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "razorpay-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a gateway order for the checkout widget
#[instrument(skip(state, payload))]
pub async fn initiate_payment(
    State(state): State<AppState>,
    payload: Result<Json<InitiatePaymentRequest>, JsonRejection>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let amount = request
        .amount
        .ok_or_else(|| PaymentError::missing("amount"))
        .and_then(|a| a.value("amount"))
        .and_then(|amount| validate_amount(amount).map(|()| amount))
        .map_err(payment_error_to_response)?;

    let currency = match request.currency.as_deref() {
        None => Currency::default(),
        Some(code) => Currency::parse(code).ok_or_else(|| {
            payment_error_to_response(PaymentError::InvalidRequest(format!(
                "Unsupported currency: {}",
                code
            )))
        })?,
    };

    let gateway = state.gateway().map_err(payment_error_to_response)?;
    let key_id = state.key_id.clone().unwrap_or_default();

    let mut order_request = OrderRequest::new(amount, currency);
    if let Some(receipt) = request.receipt.filter(|r| !r.trim().is_empty()) {
        order_request = order_request.with_receipt(receipt);
    }
    for (key, value) in request.notes {
        order_request = order_request.with_note(key, value);
    }

    let order = gateway.create_order(&order_request).await.map_err(|e| {
        error!("Failed to create order: {}", e);
        relay_error("Failed to create order", e)
    })?;

    info!("Created order: id={}, amount={}", order.id, order.amount);

    Ok(Json(InitiatePaymentResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id,
    }))
}

/// Verify a one-time checkout payment, then return the gateway's payment record
#[instrument(skip(state, payload))]
pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, Response> {
    let Json(request) = payload.map_err(|r| rejection_to_response(r).into_response())?;

    let verifier = state
        .payment_verifier()
        .map_err(|e| verify_failure(e, "payment verification unavailable", None))?;

    let order_id = request.order_id.unwrap_or_default();
    let payment_id = request.payment_id.unwrap_or_default();
    let signature = request.signature.unwrap_or_default();

    if let Verification::Rejected(reason) =
        verifier.verify_payment(&order_id, &payment_id, &signature)
    {
        warn!("Payment signature rejected: order={}, reason={}", order_id, reason.code());
        return Err(verify_failure(
            reason.into(),
            "payment verification failed",
            Some(reason.code()),
        ));
    }

    let gateway = state
        .gateway()
        .map_err(|e| verify_failure(e, "payment verification unavailable", None))?;
    let payment = gateway.fetch_payment(&payment_id).await.map_err(|e| {
        error!("Failed to fetch payment {}: {}", payment_id, e);
        verify_failure(e, "Failed to fetch payment details", None)
    })?;

    info!("Payment verified: id={}, order={}", payment.id, order_id);

    Ok(Json(VerifyPaymentResponse {
        is_ok: true,
        message: "payment verified successfully".to_string(),
        data: payment,
    }))
}

/// Verify a subscription payment, then return the gateway's payment record
#[instrument(skip(state, payload))]
pub async fn verify_subscription(
    State(state): State<AppState>,
    payload: Result<Json<VerifySubscriptionRequest>, JsonRejection>,
) -> Result<Json<VerifySubscriptionResponse>, Response> {
    let Json(request) = payload.map_err(|r| rejection_to_response(r).into_response())?;

    let verifier = state
        .payment_verifier()
        .map_err(|e| verify_failure(e, "subscription verification unavailable", None))?;

    let subscription_id = request.subscription_id.unwrap_or_default();
    let payment_id = request.payment_id.unwrap_or_default();
    let signature = request.signature.unwrap_or_default();

    if let Verification::Rejected(reason) =
        verifier.verify_subscription_payment(&subscription_id, &payment_id, &signature)
    {
        warn!(
            "Subscription signature rejected: subscription={}, reason={}",
            subscription_id,
            reason.code()
        );
        return Err(verify_failure(
            reason.into(),
            "Invalid signature",
            Some(reason.code()),
        ));
    }

    let gateway = state
        .gateway()
        .map_err(|e| verify_failure(e, "subscription verification unavailable", None))?;
    let payment = gateway.fetch_payment(&payment_id).await.map_err(|e| {
        error!("Failed to fetch payment {}: {}", payment_id, e);
        verify_failure(e, "Failed to verify subscription", None)
    })?;

    info!(
        "Subscription payment verified: subscription={}, payment={}",
        subscription_id, payment.id
    );

    Ok(Json(VerifySubscriptionResponse {
        is_ok: true,
        message: "Subscription verified successfully".to_string(),
        payment,
    }))
}

/// Handle a Razorpay webhook.
///
/// The signature covers the raw body, so the body is taken as bytes and only
/// parsed once it has been verified.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn razorpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let verifier = state.webhook_verifier().map_err(payment_error_to_response)?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    verifier
        .verify_webhook(&body, signature)
        .into_result()
        .map_err(|e| {
            warn!("Webhook signature rejected: {}", e);
            payment_error_to_response(e)
        })?;

    let event = WebhookEvent::from_slice(&body).map_err(|e| {
        error!("Webhook parse failed: {}", e);
        payment_error_to_response(e)
    })?;

    info!("Received webhook: event={}, account={:?}", event.event, event.account_id);

    dispatch_webhook_event(state.webhook_handler.as_ref(), &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(WebhookAck { received: true }))
}

/// Create a subscription plan
#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<CreatePlanRequest>, JsonRejection>,
) -> Result<Json<CreatePlanResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let name = require(request.name, "name").map_err(payment_error_to_response)?;
    let amount = request
        .amount
        .ok_or_else(|| PaymentError::missing("amount"))
        .and_then(|a| a.value("amount"))
        .map_err(payment_error_to_response)?;
    let interval_count = request
        .interval_count
        .map(|c| c.count("intervalCount"))
        .transpose()
        .map_err(payment_error_to_response)?;

    let is_test_plan = request.is_test_plan.unwrap_or(false);
    let mut draft = PlanDraft::new(name, amount).test_plan(is_test_plan);
    if let Some(description) = request.description {
        draft = draft.with_description(description);
    }
    if let Some(interval) = request.interval {
        draft = draft.with_interval(interval, interval_count);
    } else {
        draft.interval_count = interval_count;
    }

    let plan_request = PlanRequest::from_draft(&draft).map_err(payment_error_to_response)?;
    let gateway = state.gateway().map_err(payment_error_to_response)?;

    let plan = gateway.create_plan(&plan_request).await.map_err(|e| {
        error!("Failed to create plan: {}", e);
        relay_error("Failed to create plan", e)
    })?;

    let message = if draft.is_test_plan {
        "Plan created successfully (Test Plan)"
    } else {
        "Plan created successfully"
    };

    Ok(Json(CreatePlanResponse {
        success: true,
        plan,
        message: message.to_string(),
    }))
}

/// Create a subscription for a plan
#[instrument(skip(state, payload))]
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<Json<CreateSubscriptionResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;
    let plan_id = require(request.plan_id, "planId").map_err(payment_error_to_response)?;
    let gateway = state.gateway().map_err(payment_error_to_response)?;

    let subscription = gateway
        .create_subscription(&SubscriptionRequest::new(plan_id))
        .await
        .map_err(|e| {
            error!("Failed to create subscription: {}", e);
            relay_error("Failed to create subscription", e)
        })?;

    Ok(Json(CreateSubscriptionResponse {
        subscription_id: subscription.id,
        status: subscription.status,
    }))
}

/// Cancel a subscription immediately
#[instrument(skip(state, payload))]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CancelSubscriptionRequest>, JsonRejection>,
) -> Result<Json<CancelSubscriptionResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;
    let subscription_id =
        require(request.subscription_id, "subscriptionId").map_err(payment_error_to_response)?;
    let gateway = state.gateway().map_err(payment_error_to_response)?;

    let subscription = gateway
        .cancel_subscription(&subscription_id, false)
        .await
        .map_err(|e| {
            error!("Failed to cancel subscription {}: {}", subscription_id, e);
            relay_error("Failed to cancel subscription", e)
        })?;

    info!("Cancelled subscription: {}", subscription.id);

    Ok(Json(CancelSubscriptionResponse {
        message: "Subscription cancelled successfully".to_string(),
        subscription,
    }))
}

/// List subscriptions.
///
/// Not scoped to a caller: there is no local record of who owns which
/// subscription, so every gateway subscription is returned.
#[instrument(skip(state))]
pub async fn list_active_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<SubscriptionListResponse>, ApiError> {
    let gateway = state.gateway().map_err(payment_error_to_response)?;
    let subscriptions = gateway.list_subscriptions().await.map_err(|e| {
        error!("Failed to fetch subscriptions: {}", e);
        relay_error("Failed to fetch subscriptions", e)
    })?;

    Ok(Json(SubscriptionListResponse { subscriptions }))
}

/// Fetch one subscription, decorated with its plan name when the plan lookup succeeds
#[instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription_id =
        require(Some(subscription_id), "id").map_err(payment_error_to_response)?;
    let gateway = state.gateway().map_err(payment_error_to_response)?;

    let mut subscription = gateway
        .fetch_subscription(&subscription_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch subscription {}: {}", subscription_id, e);
            relay_error("Failed to fetch subscription details", e)
        })?;

    if let Some(plan_id) = subscription.plan_id().map(str::to_owned) {
        match gateway.fetch_plan(&plan_id).await {
            Ok(plan) => subscription.plan_name = Some(plan.item.name),
            Err(e) => warn!("Plan lookup failed for {}: {}", plan_id, e),
        }
    }

    Ok(Json(SubscriptionResponse {
        success: true,
        subscription,
    }))
}

/// List plans
#[instrument(skip(state))]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<PlanListResponse>, ApiError> {
    let gateway = state.gateway().map_err(payment_error_to_response)?;
    let plans = gateway.list_plans().await.map_err(|e| {
        error!("Failed to fetch plans: {}", e);
        relay_error("Failed to fetch plans", e)
    })?;

    Ok(Json(PlanListResponse { plans }))
}

/// Append a contact form submission to the spreadsheet.
///
/// Any failure past input validation, including missing Google credentials,
/// is answered with the same 500 envelope.
#[instrument(skip(state, payload))]
pub async fn submit_form(
    State(state): State<AppState>,
    payload: Result<Json<FormRequest>, JsonRejection>,
) -> Result<Json<FormResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;
    let name = require(request.name, "name").map_err(payment_error_to_response)?;
    let email = require(request.email, "email").map_err(payment_error_to_response)?;

    let submission = FormSubmission::new(name, email);
    let result = match state.sheets() {
        Ok(sheets) => sheets.append_submission(&submission).await,
        Err(e) => Err(e),
    };

    let data = result.map_err(|e| {
        error!("Failed to submit form data: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to submit form data", 500).with_details(e.to_string())),
        )
    })?;

    Ok(Json(FormResponse { data }))
}
