//! # Spreadsheet Bridge
//!
//! Contact-form submissions are appended as rows to a hosted spreadsheet.
//! Like [`PaymentGateway`](crate::PaymentGateway), the client is built once
//! and injected so handlers can be tested against a fake.

use crate::error::PaymentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One contact-form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub name: String,
    pub email: String,
}

impl FormSubmission {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Cells of the appended row, in column order
    pub fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone()]
    }
}

/// Appends form submissions to a spreadsheet.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Append one row; returns the service's update summary verbatim.
    async fn append_submission(&self, submission: &FormSubmission) -> PaymentResult<Value>;
}

pub type BoxedSheetsClient = Arc<dyn SheetsClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_order() {
        let submission = FormSubmission::new("Asha", "asha@example.com");
        assert_eq!(submission.row(), vec!["Asha", "asha@example.com"]);
    }
}
