//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay integration.
//! All secrets are loaded from environment variables and held as
//! `SecretString` so they never show up in logs or `Debug` output.

use pay_core::PaymentError;
use secrecy::{ExposeSecret, SecretString};
use std::env;

/// Default Razorpay REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay API configuration
#[derive(Debug)]
pub struct RazorpayConfig {
    /// Key id (rzp_test_... or rzp_live_...)
    pub key_id: String,

    /// Key secret. Also signs checkout payment callbacks.
    pub key_secret: SecretString,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    ///
    /// Optional:
    /// - `RAZORPAY_API_BASE_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let key_id = non_empty_var("RAZORPAY_KEY_ID").ok_or_else(|| {
            PaymentError::Configuration("RAZORPAY_KEY_ID not set".to_string())
        })?;

        let key_secret = non_empty_var("RAZORPAY_KEY_SECRET").ok_or_else(|| {
            PaymentError::Configuration("RAZORPAY_KEY_SECRET not set".to_string())
        })?;

        validate_key_id(&key_id)?;

        let api_base_url = non_empty_var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            key_id,
            key_secret: SecretString::new(key_secret),
            api_base_url,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }

    /// "test" or "live", for the start-up log
    pub fn mode(&self) -> &'static str {
        if self.is_test_mode() {
            "test"
        } else if self.is_live_mode() {
            "live"
        } else {
            "unknown"
        }
    }

    /// Key secret, for building the signature verifier
    pub fn key_secret(&self) -> &str {
        self.key_secret.expose_secret()
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Webhook signing secret, configured independently of the API keys.
///
/// Reads `RAZORPAY_WEBHOOK_SECRET`.
pub fn webhook_secret_from_env() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    non_empty_var("RAZORPAY_WEBHOOK_SECRET").map(SecretString::new)
}

fn validate_key_id(key_id: &str) -> Result<(), PaymentError> {
    if !key_id.starts_with("rzp_test_") && !key_id.starts_with("rzp_live_") {
        return Err(PaymentError::Configuration(
            "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
        ));
    }
    Ok(())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_modes() {
        let config = RazorpayConfig::new("rzp_test_CgomCwv3NgvMfi", "secret");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
        assert_eq!(config.mode(), "test");

        let config = RazorpayConfig::new("rzp_live_abc123", "secret");
        assert!(!config.is_test_mode());
        assert!(config.is_live_mode());
        assert_eq!(config.mode(), "live");
    }

    #[test]
    fn test_key_id_validation() {
        assert!(validate_key_id("rzp_test_abc").is_ok());
        assert!(validate_key_id("rzp_live_abc").is_ok());
        assert!(matches!(
            validate_key_id("sk_test_abc"),
            Err(PaymentError::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = RazorpayConfig::new("rzp_test_abc", "very-secret-value");
        let debug = format!("{:?}", config);
        assert!(debug.contains("rzp_test_abc"));
        assert!(!debug.contains("very-secret-value"));
        assert_eq!(config.key_secret(), "very-secret-value");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config =
            RazorpayConfig::new("rzp_test_abc", "s").with_api_base_url("http://localhost:9000/");
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }
}
