//! # Payment Error Types
//!
//! Typed error handling for the relay.
//! All gateway and verification operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A required input field was absent or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Payment or webhook signature did not match
    #[error("Signature verification failed")]
    SignatureMismatch,

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Shorthand for a missing-field error
    pub fn missing(field: impl Into<String>) -> Self {
        PaymentError::MissingField {
            field: field.into(),
        }
    }

    /// Returns true for failures that happened upstream of the relay
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PaymentError::ProviderError { .. }
                | PaymentError::NetworkError(_)
                | PaymentError::Serialization(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::MissingField { .. } => 400,
            PaymentError::SignatureMismatch => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors() {
        assert!(PaymentError::NetworkError("timeout".into()).is_upstream());
        assert!(PaymentError::Serialization("bad body".into()).is_upstream());
        assert!(!PaymentError::InvalidRequest("bad data".into()).is_upstream());
        assert!(!PaymentError::SignatureMismatch.is_upstream());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(PaymentError::missing("planId").status_code(), 400);
        assert_eq!(PaymentError::SignatureMismatch.status_code(), 400);
        assert_eq!(
            PaymentError::Configuration("RAZORPAY_KEY_ID not set".into()).status_code(),
            500
        );
        assert_eq!(
            PaymentError::ProviderError {
                provider: "razorpay".into(),
                message: "bad".into()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = PaymentError::missing("subscriptionId");
        assert_eq!(err.to_string(), "Missing required field: subscriptionId");
        assert!(!err.is_upstream());
    }
}
