//! # Request Handlers
//!
//! Axum request handlers for the payments page and the JSON API.
//! Each request opens its own `PaymentDialog`, so every submit gets a fresh
//! reference and exactly one notification.

use crate::pages::{payment_page, redirect_page, HtmlTemplate, PaymentPage};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use pay_core::{
    CheckoutRedirect, DialogOutcome, FieldError, Notification, PaymentDialog, PaymentError,
    PaymentForm, TransactionReference, TransactionStatus,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }
}

fn status_of(err: &PaymentError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Payer-facing message plus field details; internals stay in the logs
fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_of(&err);
    let mut response = ErrorResponse::new(err.user_message(), status.as_u16());
    if let PaymentError::Validation(errors) = err {
        response = response.with_fields(errors.iter().cloned().collect());
    }
    (status, Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sanctuary-pay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn page<'a>(state: &'a AppState) -> PaymentPage<'a> {
    PaymentPage {
        action: state.payments_path(),
        currency: state.settings.currency,
        purpose: state.settings.purpose,
        minimum_amount: state.settings.minimum_amount,
        ..PaymentPage::default()
    }
}

/// Payments page. Consumes the `?payment=` return marker if present.
#[instrument(skip_all)]
pub async fn payments_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let reconciliation = match state.reconciler.reconcile_path(target) {
        Ok(reconciliation) => reconciliation,
        Err(e) => {
            warn!("Could not read return marker: {}", e);
            return HtmlTemplate(payment_page(&page(&state))).into_response();
        }
    };

    if reconciliation.is_neutral() {
        debug!("Neutral page load: {}", uri.path());
    } else {
        info!(signal = ?reconciliation.signal, "Payer returned from checkout");
    }

    let replace_location = reconciliation.cleaned_location();
    HtmlTemplate(payment_page(&PaymentPage {
        notification: reconciliation.notification.as_ref(),
        replace_location,
        ..page(&state)
    }))
    .into_response()
}

/// Form submit from the payments page
#[instrument(skip(state, form))]
pub async fn submit_payment_form(
    State(state): State<AppState>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let mut dialog = PaymentDialog::open(state.flow.clone());

    match dialog.submit(&form, state.gateway.as_ref()).await {
        DialogOutcome::Redirect {
            redirect,
            notification,
        } => HtmlTemplate(redirect_page(
            &redirect,
            &notification,
            &form,
            state.settings.redirect_delay_secs,
        ))
        .into_response(),
        DialogOutcome::Failed {
            error,
            notification,
        } => render_failed_form(&state, &form, &error, &notification),
        DialogOutcome::Suppressed => StatusCode::NO_CONTENT.into_response(),
    }
}

fn render_failed_form(
    state: &AppState,
    form: &PaymentForm,
    error: &PaymentError,
    notification: &Notification,
) -> Response {
    let field_errors = match error {
        PaymentError::Validation(errors) => Some(errors),
        _ => None,
    };

    let template = payment_page(&PaymentPage {
        form: Some(form),
        notification: Some(notification),
        field_errors,
        ..page(state)
    });

    (status_of(error), HtmlTemplate(template)).into_response()
}

/// Malformed or mistyped JSON bodies answer in the same shape as every other error
fn json_rejection_to_response(rejection: JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    let status = rejection.status();
    warn!("Rejected payment request body: {}", rejection.body_text());
    let response = ErrorResponse::new(
        "Invalid payment request. Please check the details and try again.",
        status.as_u16(),
    );
    (status, Json(response))
}

/// Initiate a payment from a JSON client
#[instrument(skip_all)]
pub async fn api_initiate(
    State(state): State<AppState>,
    body: Result<Json<PaymentForm>, JsonRejection>,
) -> Result<Json<CheckoutRedirect>, (StatusCode, Json<ErrorResponse>)> {
    let Json(form) = body.map_err(json_rejection_to_response)?;
    let mut dialog = PaymentDialog::open(state.flow.clone());

    match dialog.submit(&form, state.gateway.as_ref()).await {
        DialogOutcome::Redirect { redirect, .. } => Ok(Json(redirect)),
        DialogOutcome::Failed { error, .. } => Err(payment_error_to_response(error)),
        DialogOutcome::Suppressed => Err(payment_error_to_response(PaymentError::Internal(
            "submission suppressed".to_string(),
        ))),
    }
}

/// Look up a transaction at the gateway by reference
#[instrument(skip_all, fields(reference = %reference))]
pub async fn api_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<TransactionStatus>, (StatusCode, Json<ErrorResponse>)> {
    let reference = TransactionReference::new(reference);

    let status = state
        .gateway
        .verify(&reference)
        .await
        .map_err(payment_error_to_response)?;

    info!(state = ?status.state, "Transaction status looked up");
    Ok(Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{Field, ValidationErrors};

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert!(err.fields.is_empty());
    }

    #[test]
    fn test_payment_error_conversion() {
        let err = PaymentError::NetworkError("connection refused".to_string());
        let (status, Json(body)) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.contains("connection refused"));
    }

    #[test]
    fn test_validation_error_carries_fields() {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(Field::Email, "Please enter a valid email address"));

        let (status, Json(body)) = payment_error_to_response(PaymentError::Validation(errors));

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "Please enter a valid email address");
        assert_eq!(body.fields.len(), 1);
    }
}
