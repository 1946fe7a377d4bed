//! # Signature Verification
//!
//! HMAC-SHA256 checks proving that a checkout callback or a webhook really
//! came from Razorpay.
//!
//! | Check | Secret | Signed message |
//! |-------|--------|----------------|
//! | one-time payment | key secret | `order_id + "|" + payment_id` |
//! | subscription payment | key secret | `payment_id + "|" + subscription_id` |
//! | webhook | webhook secret | raw request body |
//!
//! Digests are lowercase hex and compared in constant time. The verifier does
//! no I/O and never fails hard: every outcome is a [`Verification`].

use hmac::{Hmac, Mac};
use pay_core::PaymentError;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Why a signature check was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A required input was absent or blank; no HMAC was computed
    MissingField(&'static str),
    /// The claimed signature does not match the computed one
    SignatureMismatch,
}

impl RejectReason {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MissingField(_) => "missing_field",
            RejectReason::SignatureMismatch => "signature_mismatch",
        }
    }
}

impl From<RejectReason> for PaymentError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::MissingField(field) => PaymentError::missing(field),
            RejectReason::SignatureMismatch => PaymentError::SignatureMismatch,
        }
    }
}

/// Outcome of a signature check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Rejected(RejectReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Verification::Valid => None,
            Verification::Rejected(reason) => Some(*reason),
        }
    }

    /// Convert to a result for `?` propagation
    pub fn into_result(self) -> Result<(), PaymentError> {
        match self {
            Verification::Valid => Ok(()),
            Verification::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// Computes and checks Razorpay HMAC signatures with one secret
#[derive(Debug)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    pub fn from_secret(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Lowercase hex HMAC-SHA256 of `message`
    pub fn sign(&self, message: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Signature of a one-time payment: `order_id|payment_id`
    pub fn sign_payment(&self, order_id: &str, payment_id: &str) -> String {
        self.sign(format!("{}|{}", order_id, payment_id).as_bytes())
    }

    /// Verify a one-time payment callback
    pub fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Verification {
        if let Some(field) = first_missing(&[
            ("orderId", order_id),
            ("paymentId", payment_id),
            ("signature", signature),
        ]) {
            return Verification::Rejected(RejectReason::MissingField(field));
        }
        compare(&self.sign_payment(order_id, payment_id), signature)
    }

    /// Signature of a subscription payment: `payment_id|subscription_id`
    pub fn sign_subscription_payment(&self, payment_id: &str, subscription_id: &str) -> String {
        self.sign(format!("{}|{}", payment_id, subscription_id).as_bytes())
    }

    /// Verify a subscription payment callback
    pub fn verify_subscription_payment(
        &self,
        subscription_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Verification {
        if let Some(field) = first_missing(&[
            ("subscriptionId", subscription_id),
            ("paymentId", payment_id),
            ("signature", signature),
        ]) {
            return Verification::Rejected(RejectReason::MissingField(field));
        }
        compare(
            &self.sign_subscription_payment(payment_id, subscription_id),
            signature,
        )
    }

    /// Signature of a webhook body
    pub fn sign_webhook(&self, raw_body: &[u8]) -> String {
        self.sign(raw_body)
    }

    /// Verify a webhook against the exact bytes received.
    ///
    /// `raw_body` must not be parsed and re-serialized first.
    pub fn verify_webhook(&self, raw_body: &[u8], signature: &str) -> Verification {
        if signature.trim().is_empty() {
            return Verification::Rejected(RejectReason::MissingField(SIGNATURE_HEADER));
        }
        compare(&self.sign_webhook(raw_body), signature)
    }
}

fn first_missing(fields: &[(&'static str, &str)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

fn compare(expected: &str, claimed: &str) -> Verification {
    if constant_time_compare(expected.as_bytes(), claimed.as_bytes()) {
        Verification::Valid
    } else {
        Verification::Rejected(RejectReason::SignatureMismatch)
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
