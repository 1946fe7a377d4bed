//! # Google Sheets Client
//!
//! Appends rows through the Sheets v4 REST API. Access tokens come from the
//! OAuth JWT-bearer grant: a service-account assertion signed with RS256 is
//! exchanged for a bearer token, which is cached until shortly before expiry.

use crate::config::{GoogleSheetsConfig, SHEETS_SCOPES};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pay_core::{validate_entity_id, FormSubmission, PaymentError, PaymentResult, SheetsClient};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "google-sheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion, in seconds
const ASSERTION_TTL_SECS: i64 = 3600;

/// Tokens are refreshed this long before Google says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Service-account Sheets client; safe to share behind an `Arc`.
pub struct GoogleSheetsClient {
    config: GoogleSheetsConfig,
    client: Client,
    signing_key: EncodingKey,
    token: RwLock<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    /// Create a new client. Fails if the private key is not an RSA PEM.
    pub fn new(config: GoogleSheetsConfig) -> PaymentResult<Self> {
        if !validate_entity_id(&config.sheet_id) {
            return Err(PaymentError::Configuration(format!(
                "Invalid GOOGLE_SHEET_ID: {:?}",
                config.sheet_id
            )));
        }

        let signing_key = EncodingKey::from_rsa_pem(config.private_key.expose_secret().as_bytes())
            .map_err(|e| {
                PaymentError::Configuration(format!("Invalid GOOGLE_PRIVATE_KEY: {}", e))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            client,
            signing_key,
            token: RwLock::new(None),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(GoogleSheetsConfig::from_env()?)
    }

    /// Service-account email the client signs as
    pub fn client_email(&self) -> &str {
        &self.config.client_email
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.config.api_base_url, self.config.sheet_id, self.config.range
        )
    }

    fn assertion(&self) -> PaymentResult<String> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.config.client_email,
            scope: SHEETS_SCOPES,
            aud: &self.config.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| PaymentError::Configuration(format!("Failed to sign assertion: {}", e)))
    }

    async fn access_token(&self) -> PaymentResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if Instant::now() < token.expires_at {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let assertion = self.assertion()?;
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        debug!("Requesting Google access token for {}", self.config.client_email);
        let response: TokenResponse = self
            .send(self.client.post(&self.config.token_uri).form(&form))
            .await?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> PaymentResult<T> {
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
            error!("Google API error: status={}, body={}", status, body);
            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Google response: {}", e))
        })
    }
}

#[async_trait]
impl SheetsClient for GoogleSheetsClient {
    #[instrument(skip(self, submission), fields(sheet_id = %self.config.sheet_id))]
    async fn append_submission(&self, submission: &FormSubmission) -> PaymentResult<Value> {
        let token = self.access_token().await?;
        let request = self
            .client
            .post(self.append_url())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&json!({ "values": [submission.row()] }));

        let data: Value = self.send(request).await?;
        info!("Appended form submission to sheet {}", self.config.sheet_id);
        Ok(data)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_TTL_SECS as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = include_str!("../tests/test_key.pem");

    #[test]
    fn test_append_url() {
        let config = GoogleSheetsConfig::new("relay@example.com", TEST_KEY, "sheet_1")
            .with_api_base_url("http://localhost:9000");
        let client = GoogleSheetsClient::new(config).unwrap();
        assert_eq!(
            client.append_url(),
            "http://localhost:9000/v4/spreadsheets/sheet_1/values/A1:B1:append"
        );
        assert_eq!(client.client_email(), "relay@example.com");
    }

    #[test]
    fn test_assertion_is_rs256_jwt() {
        let config = GoogleSheetsConfig::new("relay@example.com", TEST_KEY, "sheet_1");
        let client = GoogleSheetsClient::new(config).unwrap();
        let jwt = client.assertion().unwrap();
        assert_eq!(jwt.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[test]
    fn test_rejects_bad_sheet_id() {
        let config = GoogleSheetsConfig::new("relay@example.com", TEST_KEY, "../other");
        assert!(matches!(
            GoogleSheetsClient::new(config),
            Err(PaymentError::Configuration(_))
        ));
    }
}
