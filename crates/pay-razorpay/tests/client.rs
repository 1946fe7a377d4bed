use pay_core::{
    OrderRequest, PaymentError, PaymentGateway, Period, PlanDraft, PlanRequest,
    SubscriptionRequest,
};
use pay_razorpay::{RazorpayClient, RazorpayConfig};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// "rzp_test_key:secret" base64-encoded
const BASIC_AUTH: &str = "Basic cnpwX3Rlc3Rfa2V5OnNlY3JldA==";

fn client_for(server: &MockServer) -> RazorpayClient {
    let config = RazorpayConfig::new("rzp_test_key", "secret").with_api_base_url(server.uri());
    RazorpayClient::new(config).unwrap()
}

fn plan_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "entity": "plan",
        "interval": 1,
        "period": "monthly",
        "item": {
            "id": "item_1",
            "name": name,
            "description": "",
            "amount": 49900,
            "currency": "INR"
        },
        "notes": [],
        "created_at": 1746250880
    })
}

#[tokio::test]
async fn fetch_payment_uses_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_QEBlQuyBFNc2pz"))
        .and(header("authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_QEBlQuyBFNc2pz",
            "entity": "payment",
            "amount": 6000,
            "currency": "INR",
            "status": "captured",
            "order_id": "order_QEBlMvuibTjAKF",
            "fee": 142
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payment = client_for(&server)
        .fetch_payment("pay_QEBlQuyBFNc2pz")
        .await
        .unwrap();

    assert_eq!(payment.status.as_deref(), Some("captured"));
    assert_eq!(payment.amount, Some(6000));
    assert_eq!(payment.extra["fee"], 142);
}

#[tokio::test]
async fn create_plan_sends_minor_units() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/plans"))
        .and(body_partial_json(json!({
            "period": "weekly",
            "interval": 1,
            "item": {"name": "Pro", "amount": 1000, "currency": "INR"},
            "notes": {"created_by": "api", "is_test_plan": "false"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_json("plan_abc", "Pro")))
        .expect(1)
        .mount(&server)
        .await;

    let draft = PlanDraft::new("Pro", 10.0).with_interval("week", None);
    let request = PlanRequest::from_draft(&draft).unwrap();
    assert_eq!(request.period, Period::Weekly);

    let plan = client_for(&server).create_plan(&request).await.unwrap();
    assert_eq!(plan.id, "plan_abc");
}

#[tokio::test]
async fn list_plans_unwraps_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity": "collection",
            "count": 2,
            "items": [plan_json("plan_a", "A"), plan_json("plan_b", "B")]
        })))
        .mount(&server)
        .await;

    let plans = client_for(&server).list_plans().await.unwrap();
    let ids: Vec<_> = plans.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["plan_a", "plan_b"]);
}

#[tokio::test]
async fn create_order_posts_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_json(json!({
            "amount": 6000,
            "currency": "INR",
            "receipt": "receipt_1743596839929"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_QEBlMvuibTjAKF",
            "entity": "order",
            "amount": 6000,
            "currency": "INR",
            "receipt": "receipt_1743596839929",
            "status": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = OrderRequest::new(60.0, pay_core::Currency::INR)
        .with_receipt("receipt_1743596839929");
    let order = client_for(&server).create_order(&request).await.unwrap();

    assert_eq!(order.id, "order_QEBlMvuibTjAKF");
    assert_eq!(order.status.as_deref(), Some("created"));
}

#[tokio::test]
async fn create_subscription_posts_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions"))
        .and(body_json(json!({
            "plan_id": "plan_abc",
            "total_count": 12,
            "quantity": 1,
            "customer_notify": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "entity": "subscription",
            "plan_id": "plan_abc",
            "status": "created",
            "notes": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subscription = client_for(&server)
        .create_subscription(&SubscriptionRequest::new("plan_abc"))
        .await
        .unwrap();

    assert_eq!(subscription.id, "sub_1");
    assert_eq!(subscription.status, "created");
}

#[tokio::test]
async fn cancel_subscription_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions/sub_1/cancel"))
        .and(body_json(json!({"cancel_at_cycle_end": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "plan_id": "plan_abc",
            "status": "cancelled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subscription = client_for(&server)
        .cancel_subscription("sub_1", false)
        .await
        .unwrap();

    assert_eq!(subscription.status, "cancelled");
}

#[tokio::test]
async fn gateway_error_becomes_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscriptions/sub_missing"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "The id provided does not exist"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_subscription("sub_missing")
        .await
        .unwrap_err();

    match err {
        PaymentError::ProviderError { provider, message } => {
            assert_eq!(provider, "razorpay");
            assert!(message.contains("The id provided does not exist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/plans/plan_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_plan("plan_1").await.unwrap_err();
    assert!(matches!(err, PaymentError::Serialization(_)));
}

#[tokio::test]
async fn invalid_ids_never_reach_the_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_payment("../orders")
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidRequest(_)));
}

#[tokio::test]
async fn unreachable_gateway_is_network_error() {
    let config = RazorpayConfig::new("rzp_test_key", "secret")
        .with_api_base_url("http://127.0.0.1:1");
    let client = RazorpayClient::new(config).unwrap();

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(matches!(err, PaymentError::NetworkError(_)));
}
