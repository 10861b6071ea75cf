//! # Payment Error Types
//!
//! Typed error handling for the sanctuary-pay payment flow.
//! All payment operations return `Result<T, PaymentError>`.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Message shown when the gateway rejects without saying why.
pub const GENERIC_REJECTION_MESSAGE: &str = "Payment could not be initiated. Please try again.";

/// Message shown for transport failures and unusable gateway responses.
pub const GENERIC_RETRY_MESSAGE: &str =
    "We could not reach the payment service. Please check your connection and try again.";

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more form fields failed validation
    #[error("Invalid payment details: {0}")]
    Validation(ValidationErrors),

    /// The gateway answered `status: false`
    #[error("Gateway rejected payment: {message}")]
    GatewayRejected { message: String },

    /// The gateway claimed success but gave no usable checkout URL
    #[error("Gateway accepted payment without a checkout URL")]
    MissingCheckoutUrl,

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body could not be understood
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A submission is already in flight or the browser is being redirected
    #[error("A payment submission is already in progress")]
    SubmissionInProgress,

    /// The dialog is in a state where the operation is not allowed
    #[error("Invalid dialog state: {0}")]
    InvalidState(String),

    /// Transaction reference unknown to the gateway
    #[error("Transaction not found: {reference}")]
    TransactionNotFound { reference: String },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true if the user may simply resubmit
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Validation(_)
                | PaymentError::GatewayRejected { .. }
                | PaymentError::MissingCheckoutUrl
                | PaymentError::NetworkError(_)
                | PaymentError::Serialization(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::Validation(_) => 422,
            PaymentError::GatewayRejected { .. } => 502,
            PaymentError::MissingCheckoutUrl => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Serialization(_) => 502,
            PaymentError::SubmissionInProgress => 409,
            PaymentError::InvalidState(_) => 409,
            PaymentError::TransactionNotFound { .. } => 404,
            PaymentError::Internal(_) => 500,
        }
    }

    /// The single message a payer sees for this error.
    ///
    /// Transport and malformed-response failures collapse to the same
    /// generic retry text as an explicit rejection without a message.
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| GENERIC_REJECTION_MESSAGE.to_string()),
            PaymentError::GatewayRejected { message } => message.clone(),
            PaymentError::MissingCheckoutUrl
            | PaymentError::NetworkError(_)
            | PaymentError::Serialization(_) => GENERIC_RETRY_MESSAGE.to_string(),
            PaymentError::SubmissionInProgress => {
                "Your payment is already being processed.".to_string()
            }
            PaymentError::TransactionNotFound { reference } => {
                format!("No payment found with reference {}", reference)
            }
            PaymentError::Configuration(_)
            | PaymentError::InvalidState(_)
            | PaymentError::Internal(_) => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
