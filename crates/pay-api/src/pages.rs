//! # Pages
//!
//! Server-rendered HTML for the payments route: the payment form, the
//! redirect acknowledgment, and the one-shot callback notification.
//! Templates live in `templates/` and are escaped by askama.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pay_core::{
    CheckoutRedirect, Currency, Field, Notification, PaymentForm, PaymentPurpose, ValidationErrors,
};
use tracing::error;

/// Renders an askama template as an HTML response
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!("Failed to render template: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }
}

/// Everything the payment form page needs
#[derive(Debug, Default)]
pub struct PaymentPage<'a> {
    pub action: &'a str,
    pub form: Option<&'a PaymentForm>,
    pub notification: Option<&'a Notification>,
    pub field_errors: Option<&'a ValidationErrors>,
    /// Location for `history.replaceState` once the marker is consumed
    pub replace_location: Option<String>,
    pub currency: Currency,
    pub purpose: PaymentPurpose,
    pub minimum_amount: f64,
}

#[derive(Template)]
#[template(path = "payments.html")]
pub struct PaymentTemplate {
    action: String,
    form: PaymentForm,
    notification: Option<Notification>,
    name_error: Option<String>,
    email_error: Option<String>,
    amount_error: Option<String>,
    /// Already a script-safe JavaScript string literal
    replace_location: Option<String>,
    currency: Currency,
    purpose: PaymentPurpose,
    minimum: String,
}

#[derive(Template)]
#[template(path = "redirect.html")]
pub struct RedirectTemplate {
    notification: Option<Notification>,
    form: PaymentForm,
    checkout_url: String,
    reference: String,
    delay_secs: u64,
}

/// Encode a string as a JavaScript literal safe inside `<script>`
fn js_string(raw: &str) -> String {
    serde_json::to_string(raw)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

fn field_message(errors: Option<&ValidationErrors>, field: Field) -> Option<String> {
    errors.and_then(|e| e.get(field)).map(|e| e.message.clone())
}

/// The payment form, optionally carrying one notification
pub fn payment_page(page: &PaymentPage<'_>) -> PaymentTemplate {
    PaymentTemplate {
        action: page.action.to_string(),
        form: page.form.cloned().unwrap_or_default(),
        notification: page.notification.cloned(),
        name_error: field_message(page.field_errors, Field::Name),
        email_error: field_message(page.field_errors, Field::Email),
        amount_error: field_message(page.field_errors, Field::Amount),
        replace_location: page.replace_location.as_deref().map(js_string),
        currency: page.currency,
        purpose: page.purpose,
        minimum: page.currency.format_amount(page.minimum_amount),
    }
}

/// Acknowledgment shown while the browser navigates to the checkout page.
///
/// The form is rendered disabled; navigation goes to the exact URL the
/// gateway returned.
pub fn redirect_page(
    redirect: &CheckoutRedirect,
    notification: &Notification,
    form: &PaymentForm,
    delay_secs: u64,
) -> RedirectTemplate {
    RedirectTemplate {
        notification: Some(notification.clone()),
        form: form.clone(),
        checkout_url: redirect.checkout_url.clone(),
        reference: redirect.reference.to_string(),
        delay_secs,
    }
}
