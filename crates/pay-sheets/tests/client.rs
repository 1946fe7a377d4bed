use pay_core::{FormSubmission, PaymentError, SheetsClient};
use pay_sheets::{GoogleSheetsClient, GoogleSheetsConfig};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("test_key.pem");

const APPEND_PATH: &str = "/v4/spreadsheets/sheet_1/values/A1:B1:append";

fn client_for(server: &MockServer) -> GoogleSheetsClient {
    let email = "relay@project.iam.gserviceaccount.com";
    let config = GoogleSheetsConfig::new(email, TEST_KEY, "sheet_1")
        .with_api_base_url(server.uri())
        .with_token_uri(format!("{}/token", server.uri()));
    GoogleSheetsClient::new(config).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn append_sends_row_with_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(header("authorization", "Bearer ya29.test"))
        .and(body_json(json!({ "values": [["Asha", "asha@example.com"]] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sheet_1",
            "updates": { "updatedRange": "Sheet1!A2:B2", "updatedRows": 1 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let submission = FormSubmission::new("Asha", "asha@example.com");

    let data = client.append_submission(&submission).await.unwrap();
    assert_eq!(data["updates"]["updatedRows"], 1);

    // Second append reuses the cached token; the token mock expects one call.
    client.append_submission(&submission).await.unwrap();
}

#[tokio::test]
async fn append_error_maps_to_provider_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The caller does not have permission" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .append_submission(&FormSubmission::new("Asha", "asha@example.com"))
        .await
        .unwrap_err();

    match err {
        PaymentError::ProviderError { provider, message } => {
            assert_eq!(provider, "google-sheets");
            assert!(message.contains("403"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn token_rejection_stops_before_append() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .append_submission(&FormSubmission::new("Asha", "asha@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::ProviderError { .. }));
}

#[test]
fn invalid_private_key_is_configuration_error() {
    let config = GoogleSheetsConfig::new("relay@example.com", "not a pem", "sheet_1");
    assert!(matches!(
        GoogleSheetsClient::new(config),
        Err(PaymentError::Configuration(_))
    ));
}
