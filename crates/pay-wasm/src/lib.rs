//! # pay-wasm
//!
//! WebAssembly bindings for sanctuary-pay.
//!
//! This crate provides WASM-compatible functions for:
//! - Validating the payment form client-side, with the server's messages
//! - Consuming the `?payment=` return marker and scrubbing it from the address bar
//! - Sending the whole page to the gateway's checkout URL
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { reconcile_location, validate_payment_form, redirect_to } from 'sanctuary-pay-wasm';
//!
//! await init();
//!
//! const notification = reconcile_location();
//! if (notification) showToast(notification.kind, notification.message);
//!
//! const check = validate_payment_form({ name, email, amount }, 100);
//! if (check.valid) {
//!   const res = await fetch('/api/v1/payments', { method: 'POST', body: JSON.stringify({ name, email, amount }) });
//!   const { checkoutUrl } = await res.json();
//!   redirect_to(checkoutUrl);
//! }
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use pay_core::{
    CallbackReconciler, Currency, FieldError, Notification, PaymentForm, ReturnSignal,
    ValidationRules,
};
use serde::Serialize;
use url::Url;
use wasm_bindgen::prelude::*;

/// Result of a client-side form check
#[derive(Debug, Serialize)]
pub struct FormCheck {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// What the page should show after loading
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCheck {
    pub signal: ReturnSignal,
    pub notification: Option<Notification>,
    /// Same-origin location to hand to `history.replaceState`
    pub cleaned_location: Option<String>,
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| js_error("no window available"))
}

pub fn check_form(form: &PaymentForm, minimum_amount: Option<f64>) -> FormCheck {
    let mut rules = ValidationRules::default();
    if let Some(minimum) = minimum_amount {
        rules.minimum_amount = minimum;
    }

    match pay_core::validate(form, &rules) {
        Ok(_) => FormCheck {
            valid: true,
            errors: Vec::new(),
        },
        Err(errors) => FormCheck {
            valid: false,
            errors: errors.iter().cloned().collect(),
        },
    }
}

/// Read the return marker from `href` without touching the browser
pub fn check_href(href: &str) -> Result<LocationCheck, url::ParseError> {
    let url = Url::parse(href)?;
    let reconciliation = CallbackReconciler::new().reconcile(&url);
    let cleaned_location = reconciliation.cleaned_location();

    Ok(LocationCheck {
        signal: reconciliation.signal,
        notification: reconciliation.notification,
        cleaned_location,
    })
}

/// Only absolute http(s) URLs are followed
pub fn checkout_target(url: &str) -> Option<Url> {
    Url::parse(url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

/// The gateway's URL exactly as returned, minus surrounding whitespace
pub fn checkout_href(url: &str) -> Option<&str> {
    let href = url.trim();
    checkout_target(href).map(|_| href)
}

/// Validate `{ name, email, phone?, amount }`.
///
/// Returns `{ valid, errors: [{ field, message }] }`.
#[wasm_bindgen]
pub fn validate_payment_form(form: JsValue, minimum_amount: Option<f64>) -> Result<JsValue, JsValue> {
    let form: PaymentForm = serde_wasm_bindgen::from_value(form)
        .map_err(|e| js_error(format!("Invalid payment form: {}", e)))?;

    serde_wasm_bindgen::to_value(&check_form(&form, minimum_amount)).map_err(Into::into)
}

/// Reconcile an arbitrary URL; returns `{ signal, notification, cleanedLocation }`
#[wasm_bindgen]
pub fn reconcile_href(href: &str) -> Result<JsValue, JsValue> {
    let check = check_href(href).map_err(|e| js_error(format!("Invalid URL: {}", e)))?;
    serde_wasm_bindgen::to_value(&check).map_err(Into::into)
}

/// Read the marker from the current address and remove it in one step.
///
/// Returns the notification to show, or `undefined` on a neutral load.
#[wasm_bindgen]
pub fn reconcile_location() -> Result<JsValue, JsValue> {
    let window = window()?;
    let href = window.location().href()?;
    let check = check_href(&href).map_err(|e| js_error(format!("Invalid URL: {}", e)))?;

    if let Some(location) = &check.cleaned_location {
        window
            .history()?
            .replace_state_with_url(&JsValue::NULL, "", Some(location.as_str()))?;
    }

    match &check.notification {
        Some(notification) => serde_wasm_bindgen::to_value(notification).map_err(Into::into),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Navigate the whole page to the checkout URL
#[wasm_bindgen]
pub fn redirect_to(url: &str) -> Result<(), JsValue> {
    let href = checkout_href(url).ok_or_else(|| js_error("Checkout URL is not usable"))?;
    window()?.location().assign(href)
}

/// Format an amount for display, e.g. `format_amount(5000, "NGN")` → "₦5,000.00"
#[wasm_bindgen]
pub fn format_amount(amount: f64, currency: &str) -> Result<String, JsValue> {
    let currency: Currency = serde_wasm_bindgen::from_value(JsValue::from_str(currency))
        .map_err(|e| js_error(format!("Unknown currency: {}", e)))?;
    Ok(currency.format_amount(amount))
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
