//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the injected gateway and spreadsheet clients, the signature
//! verifiers and the webhook handler. Anything missing from the environment stays `None` and
//! only the operations that need it fail.

use pay_core::{BoxedGateway, BoxedSheetsClient, PaymentError, PaymentResult};
use pay_razorpay::{
    webhook_secret_from_env, LoggingWebhookHandler, RazorpayClient, RazorpayConfig,
    SignatureVerifier, WebhookHandler,
};
use pay_sheets::GoogleSheetsClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e)
            })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway client
    pub gateway: Option<BoxedGateway>,
    /// Key id handed to the checkout widget
    pub key_id: Option<String>,
    /// Verifier for checkout and subscription payment callbacks (key secret)
    pub payment_verifier: Option<Arc<SignatureVerifier>>,
    /// Verifier for webhooks (webhook secret)
    pub webhook_verifier: Option<Arc<SignatureVerifier>>,
    /// Webhook event handler
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Contact form spreadsheet client
    pub sheets: Option<BoxedSheetsClient>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Empty state: nothing configured, logging webhook handler
    pub fn new(config: AppConfig) -> Self {
        Self {
            gateway: None,
            key_id: None,
            payment_verifier: None,
            webhook_verifier: None,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            sheets: None,
            config,
        }
    }

    /// Build state from environment variables.
    pub fn from_env() -> Self {
        Self::from_env_with_config(AppConfig::from_env())
    }

    /// Build state from an already loaded config plus the Razorpay and
    /// Google variables.
    ///
    /// Missing credentials are logged, not fatal.
    pub fn from_env_with_config(config: AppConfig) -> Self {
        let mut state = Self::new(config);

        match RazorpayConfig::from_env().and_then(|config| {
            if config.is_live_mode() && !state.config.is_production() {
                warn!("Live Razorpay key in {} environment", state.config.environment);
            }
            info!("Razorpay gateway: key_id={}, mode={}", config.key_id, config.mode());
            let verifier = SignatureVerifier::new(config.key_secret());
            RazorpayClient::new(config).map(|client| (client, verifier))
        }) {
            Ok((client, verifier)) => {
                state.key_id = Some(client.key_id().to_string());
                state.gateway = Some(Arc::new(client));
                state.payment_verifier = Some(Arc::new(verifier));
            }
            Err(e) => warn!("Razorpay gateway disabled: {}", e),
        }

        match webhook_secret_from_env() {
            Some(secret) => {
                state.webhook_verifier = Some(Arc::new(SignatureVerifier::from_secret(secret)));
            }
            None => warn!("RAZORPAY_WEBHOOK_SECRET not set, webhooks will be rejected"),
        }

        match GoogleSheetsClient::from_env() {
            Ok(client) => {
                info!("Form submissions go to Google Sheets as {}", client.client_email());
                state.sheets = Some(Arc::new(client));
            }
            Err(e) => warn!("Form submissions disabled: {}", e),
        }

        state
    }

    /// Builder: set the gateway client
    pub fn with_gateway(mut self, gateway: BoxedGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Builder: set the key id
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Builder: set the secret used for payment callback signatures
    pub fn with_payment_secret(mut self, secret: impl Into<String>) -> Self {
        self.payment_verifier = Some(Arc::new(SignatureVerifier::new(secret)));
        self
    }

    /// Builder: set the webhook secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_verifier = Some(Arc::new(SignatureVerifier::new(secret)));
        self
    }

    /// Builder: set the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    /// Builder: set the spreadsheet client
    pub fn with_sheets(mut self, sheets: BoxedSheetsClient) -> Self {
        self.sheets = Some(sheets);
        self
    }

    /// Gateway client, or a configuration error
    pub fn gateway(&self) -> PaymentResult<&BoxedGateway> {
        self.gateway.as_ref().ok_or_else(|| {
            PaymentError::Configuration("Razorpay gateway is not configured".to_string())
        })
    }

    /// Payment callback verifier, or a configuration error
    pub fn payment_verifier(&self) -> PaymentResult<&SignatureVerifier> {
        self.payment_verifier.as_deref().ok_or_else(|| {
            PaymentError::Configuration("RAZORPAY_KEY_SECRET not set".to_string())
        })
    }

    /// Webhook verifier, or a configuration error
    pub fn webhook_verifier(&self) -> PaymentResult<&SignatureVerifier> {
        self.webhook_verifier.as_deref().ok_or_else(|| {
            PaymentError::Configuration("RAZORPAY_WEBHOOK_SECRET not set".to_string())
        })
    }

    /// Spreadsheet client, or a configuration error
    pub fn sheets(&self) -> PaymentResult<&BoxedSheetsClient> {
        self.sheets.as_ref().ok_or_else(|| {
            PaymentError::Configuration(
                "GOOGLE_CLIENT_EMAIL, GOOGLE_PRIVATE_KEY and GOOGLE_SHEET_ID must be set"
                    .to_string(),
            )
        })
    }

    /// Names of configured providers, for the start-up log
    pub fn providers(&self) -> Vec<&'static str> {
        self.gateway.iter().map(|g| g.provider_name()).collect()
    }
}
