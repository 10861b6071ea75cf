//! # Callback URLs and Return Reconciliation
//!
//! The gateway sends the payer back to `/payments?payment=success`. There is
//! no webhook visible to this layer, so the query string is the only return
//! channel: it is read once, turned into a notification, and scrubbed so a
//! reload does not replay the outcome.
//!
//! ```text
//!   CallbackUrls::success_url()  ──►  gateway checkout  ──►  GET /payments?payment=success
//!                                                                   │
//!                                        CallbackReconciler::reconcile()
//!                                                                   │
//!                                       notification + cleaned URL (/payments)
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::notification::Notification;
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameter carrying the outcome marker
pub const MARKER_PARAM: &str = "payment";
pub const SUCCESS_MARKER: &str = "success";
pub const FAILED_MARKER: &str = "failed";

/// Default route the gateway returns to
pub const DEFAULT_PAYMENTS_PATH: &str = "/payments";

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Thank you! Your payment was completed successfully.";
pub const DEFAULT_FAILURE_MESSAGE: &str =
    "We could not confirm your payment. Please try again, or contact us if you were debited.";

/// URLs of this application handed to the gateway
#[derive(Debug, Clone)]
pub struct CallbackUrls {
    /// Public origin of the application (e.g., "https://church.example")
    base_url: Url,
    /// Payments route (e.g., "/payments")
    payments_path: String,
}

impl CallbackUrls {
    pub fn new(base_url: &str) -> PaymentResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PaymentError::Configuration(format!("invalid base URL {:?}: {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(PaymentError::Configuration(format!(
                "base URL {} cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            payments_path: DEFAULT_PAYMENTS_PATH.to_string(),
        })
    }

    /// Builder: set the payments route
    pub fn with_payments_path(mut self, path: impl Into<String>) -> Self {
        self.payments_path = path.into();
        self
    }

    pub fn payments_path(&self) -> &str {
        &self.payments_path
    }

    /// The payments route without any marker
    pub fn payments_url(&self) -> PaymentResult<Url> {
        self.base_url.join(&self.payments_path).map_err(|e| {
            PaymentError::Configuration(format!(
                "invalid payments path {:?}: {}",
                self.payments_path, e
            ))
        })
    }

    /// Where the gateway sends the payer after checkout
    pub fn success_url(&self) -> PaymentResult<String> {
        self.with_marker(SUCCESS_MARKER)
    }

    /// Symmetric failure URL for gateways that support one
    pub fn failed_url(&self) -> PaymentResult<String> {
        self.with_marker(FAILED_MARKER)
    }

    fn with_marker(&self, marker: &str) -> PaymentResult<String> {
        let mut url = self.payments_url()?;
        url.query_pairs_mut().append_pair(MARKER_PARAM, marker);
        Ok(url.to_string())
    }
}

/// Outcome signal carried by the returning URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnSignal {
    Success,
    Failed,
    None,
}

impl ReturnSignal {
    /// Read the marker from a URL. The first recognised `payment` value wins;
    /// unknown values count as no marker.
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs()
            .filter(|(key, _)| key == MARKER_PARAM)
            .find_map(|(_, value)| match &*value {
                SUCCESS_MARKER => Some(ReturnSignal::Success),
                FAILED_MARKER => Some(ReturnSignal::Failed),
                _ => None,
            })
            .unwrap_or(ReturnSignal::None)
    }
}

/// Result of reading and consuming the return signal
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub signal: ReturnSignal,
    /// Shown exactly once; `None` on neutral loads
    pub notification: Option<Notification>,
    /// URL with the marker removed; `None` when nothing needs rewriting
    pub cleaned: Option<Url>,
}

impl Reconciliation {
    /// Same-origin location for `history.replaceState` (path, query, fragment)
    pub fn cleaned_location(&self) -> Option<String> {
        self.cleaned.as_ref().map(|url| {
            let mut location = url.path().to_string();
            if let Some(query) = url.query() {
                location.push('?');
                location.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                location.push('#');
                location.push_str(fragment);
            }
            location
        })
    }

    pub fn is_neutral(&self) -> bool {
        self.signal == ReturnSignal::None
    }
}

/// Turns a returning URL into one notification and a scrubbed URL
#[derive(Debug, Clone)]
pub struct CallbackReconciler {
    success_message: String,
    failure_message: String,
}

impl CallbackReconciler {
    pub fn new() -> Self {
        Self {
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Builder: override the success message
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    /// Builder: override the failure message
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Read the marker and produce the scrubbed URL in one step.
    ///
    /// A declined card, an abandoned checkout and a dropped connection all
    /// arrive as the same failure; they cannot be told apart from the URL.
    pub fn reconcile(&self, url: &Url) -> Reconciliation {
        let signal = ReturnSignal::from_url(url);

        let notification = match signal {
            ReturnSignal::Success => Some(Notification::success(&self.success_message)),
            ReturnSignal::Failed => Some(Notification::error(&self.failure_message)),
            ReturnSignal::None => None,
        };

        let cleaned = notification.as_ref().map(|_| strip_marker(url));

        Reconciliation {
            signal,
            notification,
            cleaned,
        }
    }

    /// Reconcile a request target such as `/payments?payment=success`.
    pub fn reconcile_path(&self, path_and_query: &str) -> PaymentResult<Reconciliation> {
        let placeholder = Url::parse("http://localhost/")
            .map_err(|e| PaymentError::Internal(e.to_string()))?;
        let url = placeholder.join(path_and_query).map_err(|e| {
            PaymentError::Internal(format!("unparseable request target {:?}: {}", path_and_query, e))
        })?;
        Ok(self.reconcile(&url))
    }
}

impl Default for CallbackReconciler {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_marker(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != MARKER_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}
