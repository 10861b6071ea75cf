//! # Payment Gateway Trait
//!
//! Seam between the payment flow and the external payment-initiation API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentGateway (trait)                    │
//! │  ├── initiate()   PaymentIntent -> CheckoutRedirect         │
//! │  ├── verify()     reference -> TransactionStatus            │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴───────┐                   ┌───────┴───────┐
//!  │  HttpGateway  │                   │  test stubs   │
//!  │ (pay-gateway) │                   │               │
//!  └───────────────┘                   └───────────────┘
//! ```
//!
//! The gateway is untrusted: its answers go through [`GatewayEnvelope`]
//! before anything follows a redirect.

use crate::error::{PaymentError, PaymentResult, GENERIC_REJECTION_MESSAGE};
use crate::reference::TransactionReference;
use crate::request::PaymentIntent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send the intent and return where to send the payer.
    ///
    /// Rejections come back as `PaymentError::GatewayRejected`, transport
    /// failures as `PaymentError::NetworkError`. Implementations must not
    /// retry on their own.
    async fn initiate(&self, intent: &PaymentIntent) -> PaymentResult<CheckoutRedirect>;

    /// Look up a transaction by the reference sent at initiation.
    async fn verify(&self, reference: &TransactionReference) -> PaymentResult<TransactionStatus>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Where the payer is sent for checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    pub reference: TransactionReference,
    pub checkout_url: String,
}

/// Wire envelope used by every gateway endpoint:
/// `{ status: bool, data?: T, message?: string }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEnvelope<T> {
    pub status: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` of a successful initiation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// Decoded answer to an initiation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GatewayResponse {
    Accepted { checkout_url: String },
    Rejected { message: String },
}

impl GatewayResponse {
    /// Turn the answer into the redirect target for `reference`
    pub fn into_redirect(self, reference: TransactionReference) -> PaymentResult<CheckoutRedirect> {
        match self {
            GatewayResponse::Accepted { checkout_url } => Ok(CheckoutRedirect {
                reference,
                checkout_url,
            }),
            GatewayResponse::Rejected { message } => Err(PaymentError::GatewayRejected { message }),
        }
    }
}

impl GatewayEnvelope<CheckoutData> {
    /// Interpret an initiation envelope.
    ///
    /// `status: true` without an absolute http(s) `checkoutUrl` is an error:
    /// an empty or relative redirect is never followed.
    pub fn into_response(self) -> PaymentResult<GatewayResponse> {
        if !self.status {
            let message = non_blank(self.message)
                .unwrap_or_else(|| GENERIC_REJECTION_MESSAGE.to_string());
            return Ok(GatewayResponse::Rejected { message });
        }

        let checkout_url = self
            .data
            .and_then(|d| non_blank(d.checkout_url))
            .filter(|u| is_absolute_http(u))
            .ok_or(PaymentError::MissingCheckoutUrl)?;

        Ok(GatewayResponse::Accepted { checkout_url })
    }
}

/// Where a transaction stands according to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Success,
    Pending,
    Failed,
    Abandoned,
    Unknown,
}

impl TransactionState {
    /// Map a gateway status word; unrecognized words become `Unknown`
    pub fn from_gateway(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "success" | "successful" | "completed" | "paid" => TransactionState::Success,
            "pending" | "processing" | "ongoing" => TransactionState::Pending,
            "failed" | "declined" | "reversed" => TransactionState::Failed,
            "abandoned" | "cancelled" | "canceled" => TransactionState::Abandoned,
            _ => TransactionState::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Success | TransactionState::Failed | TransactionState::Abandoned
        )
    }
}

/// `data` of a status lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// Result of a status lookup by reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub reference: TransactionReference,
    pub state: TransactionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl GatewayEnvelope<VerifyData> {
    pub fn into_status(self, reference: TransactionReference) -> PaymentResult<TransactionStatus> {
        if !self.status {
            return Err(PaymentError::TransactionNotFound {
                reference: reference.to_string(),
            });
        }

        let data = self.data.unwrap_or_default();
        let state = data
            .status
            .as_deref()
            .map(TransactionState::from_gateway)
            .unwrap_or(TransactionState::Unknown);

        Ok(TransactionStatus {
            reference,
            state,
            amount: data.amount,
            paid_at: data.paid_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_absolute_http(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PaymentResult<GatewayResponse> {
        serde_json::from_str::<GatewayEnvelope<CheckoutData>>(body)
            .unwrap()
            .into_response()
    }

    #[test]
    fn test_accepted_envelope() {
        let response =
            parse(r#"{"status":true,"data":{"checkoutUrl":"https://gateway.example/pay/abc"}}"#)
                .unwrap();
        assert_eq!(
            response,
            GatewayResponse::Accepted {
                checkout_url: "https://gateway.example/pay/abc".into()
            }
        );
    }

    #[test]
    fn test_rejected_envelope() {
        let response = parse(r#"{"status":false,"message":"card declined"}"#).unwrap();
        assert_eq!(
            response,
            GatewayResponse::Rejected {
                message: "card declined".into()
            }
        );
    }

    #[test]
    fn test_rejected_without_message_falls_back() {
        for body in [r#"{"status":false}"#, r#"{"status":false,"message":"  "}"#] {
            let response = parse(body).unwrap();
            assert_eq!(
                response,
                GatewayResponse::Rejected {
                    message: GENERIC_REJECTION_MESSAGE.into()
                }
            );
        }
    }

    #[test]
    fn test_success_without_usable_url_is_failure() {
        for body in [
            r#"{"status":true}"#,
            r#"{"status":true,"data":{}}"#,
            r#"{"status":true,"data":{"checkoutUrl":""}}"#,
            r#"{"status":true,"data":{"checkoutUrl":"/relative"}}"#,
            r#"{"status":true,"data":{"checkoutUrl":"javascript:alert(1)"}}"#,
        ] {
            assert!(
                matches!(parse(body), Err(PaymentError::MissingCheckoutUrl)),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_rejection_into_error() {
        let err = GatewayResponse::Rejected {
            message: "card declined".into(),
        }
        .into_redirect(TransactionReference::new("PAY-1-AAAAAA"))
        .unwrap_err();

        assert_eq!(err.user_message(), "card declined");
    }

    #[test]
    fn test_verify_envelope() {
        let envelope: GatewayEnvelope<VerifyData> = serde_json::from_str(
            r#"{"status":true,"data":{"status":"Successful","amount":5000,"paidAt":"2026-10-01T10:00:00Z"}}"#,
        )
        .unwrap();
        let status = envelope
            .into_status(TransactionReference::new("PAY-1-AAAAAA"))
            .unwrap();

        assert_eq!(status.state, TransactionState::Success);
        assert_eq!(status.amount, Some(5000.0));
        assert!(status.state.is_terminal());
    }

    #[test]
    fn test_verify_unknown_reference() {
        let envelope: GatewayEnvelope<VerifyData> =
            serde_json::from_str(r#"{"status":false,"message":"not found"}"#).unwrap();
        let err = envelope
            .into_status(TransactionReference::new("PAY-1-AAAAAA"))
            .unwrap_err();

        assert!(matches!(err, PaymentError::TransactionNotFound { .. }));
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(TransactionState::from_gateway("pending"), TransactionState::Pending);
        assert_eq!(TransactionState::from_gateway("abandoned"), TransactionState::Abandoned);
        assert_eq!(TransactionState::from_gateway("weird"), TransactionState::Unknown);
        assert!(!TransactionState::Pending.is_terminal());
    }
}
