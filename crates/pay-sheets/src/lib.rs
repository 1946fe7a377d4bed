//! # pay-sheets
//!
//! Google Sheets bridge for the contact form. Implements
//! [`pay_core::SheetsClient`] with a service-account client that signs its
//! own OAuth assertions.
//!
//! ```rust,ignore
//! use pay_core::{FormSubmission, SheetsClient};
//! use pay_sheets::GoogleSheetsClient;
//!
//! let client = GoogleSheetsClient::from_env()?;
//! let data = client
//!     .append_submission(&FormSubmission::new("Asha", "asha@example.com"))
//!     .await?;
//! ```

pub mod client;
pub mod config;

pub use client::GoogleSheetsClient;
pub use config::GoogleSheetsConfig;
