use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field validation messages, keyed by field name. Ordered so the UI
/// renders errors deterministically.
pub type FieldErrors = BTreeMap<String, String>;

/// Crate-wide error type for storefront operations.
///
/// Every variant is locally recoverable by user action: validation and stock
/// errors are corrected in place, network and payment failures keep the draft
/// and wait for a manual retry. Nothing here is fatal to the session.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    ValidationFailed(FieldErrors),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Insufficient stock: requested {requested}, only {available} available")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Submission already in progress")]
    SubmissionInProgress,

    #[error("Not signed in; redirect to {redirect_to}")]
    Unauthenticated { redirect_to: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        StorefrontError::Network(err.to_string())
    }
}

impl StorefrontError {
    /// Whether the user is expected to resolve this by editing their input,
    /// as opposed to retrying an external call.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StorefrontError::Validation(_)
                | StorefrontError::ValidationFailed(_)
                | StorefrontError::OutOfStock(_)
                | StorefrontError::InsufficientStock { .. }
        )
    }

    /// Whether a retry affordance should be offered for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorefrontError::Network(_)
                | StorefrontError::Backend { .. }
                | StorefrontError::PaymentProvider(_)
        )
    }
}

/// Serializable error envelope handed to the UI layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category, e.g. "validation" or "network".
    pub error: String,
    /// Human-readable description.
    pub message: String,
    /// Field-level messages for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl From<&StorefrontError> for ErrorResponse {
    fn from(err: &StorefrontError) -> Self {
        let (error, fields) = match err {
            StorefrontError::ValidationFailed(fields) => ("validation", Some(fields.clone())),
            StorefrontError::Validation(_) => ("validation", None),
            StorefrontError::OutOfStock(_) | StorefrontError::InsufficientStock { .. } => {
                ("stock", None)
            }
            StorefrontError::Network(_) | StorefrontError::Backend { .. } => ("network", None),
            StorefrontError::PaymentProvider(_) => ("payment", None),
            StorefrontError::Unauthenticated { .. } => ("unauthenticated", None),
            StorefrontError::NotFound(_) => ("not_found", None),
            _ => ("internal", None),
        };

        Self {
            error: error.to_string(),
            message: err.to_string(),
            fields,
        }
    }
}
