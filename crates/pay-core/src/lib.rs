//! # pay-core
//!
//! Core types and traits for the sanctuary-pay payment flow.
//!
//! This crate provides:
//! - `validate` and `PaymentForm` for checking payer input before any I/O
//! - `ReferenceGenerator` for `PREFIX-<epoch_ms>-<RANDOM6>` transaction references
//! - `PaymentRequestBuilder` and `PaymentIntent` for the gateway payload
//! - `PaymentGateway` trait and `GatewayEnvelope` for talking to the gateway
//! - `CallbackReconciler` for consuming the `?payment=` return marker
//! - `PaymentDialog` state machine that owns the busy flag
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CallbackUrls, PaymentDialog, PaymentFlow, PaymentForm, PaymentRequestBuilder,
//!     ReferenceGenerator, ValidationRules, DialogOutcome};
//!
//! let urls = CallbackUrls::new("https://church.example")?;
//! let flow = Arc::new(PaymentFlow::new(
//!     ValidationRules::default(),
//!     ReferenceGenerator::default(),
//!     PaymentRequestBuilder::new(urls),
//! ));
//!
//! let mut dialog = PaymentDialog::open(flow);
//! let form = PaymentForm::new("Jane Doe", "jane@example.com", "5000");
//!
//! match dialog.submit(&form, gateway.as_ref()).await {
//!     DialogOutcome::Redirect { redirect, .. } => { /* navigate to redirect.checkout_url */ }
//!     DialogOutcome::Failed { notification, .. } => { /* show notification */ }
//!     DialogOutcome::Suppressed => {}
//! }
//! ```

pub mod callback;
pub mod dialog;
pub mod error;
pub mod gateway;
pub mod notification;
pub mod reference;
pub mod request;
pub mod validation;
pub mod vocab;

// Re-exports for convenience
pub use callback::{CallbackReconciler, CallbackUrls, Reconciliation, ReturnSignal};
pub use dialog::{DialogOutcome, DialogState, PaymentDialog, PaymentFlow};
pub use error::{PaymentError, PaymentResult};
pub use gateway::{
    BoxedPaymentGateway, CheckoutData, CheckoutRedirect, GatewayEnvelope, GatewayResponse,
    PaymentGateway, TransactionState, TransactionStatus, VerifyData,
};
pub use notification::{Notification, NotificationKind};
pub use reference::{ReferenceGenerator, TransactionReference};
pub use request::{PaymentIntent, PaymentRequestBuilder, GENERAL_ENTRY_ID};
pub use validation::{
    validate, Field, FieldError, PaymentForm, ValidatedPayment, ValidationErrors, ValidationRules,
};
pub use vocab::{Currency, PaymentMethod, PaymentPurpose};
