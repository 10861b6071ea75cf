//! # Payment Dialog
//!
//! State machine for one payment dialog instance. It owns the busy flag and
//! enforces the order validate → reference → payload → gateway call.
//!
//! ```text
//!            begin_submit()            finish(Ok)
//!   Idle ─────────────────► Submitting ───────────► Redirecting  (browser leaves)
//!    ▲  ▲                      │
//!    │  │       finish(Err)    ▼
//!    │  └──────────────────  Failed  ── begin_submit() ──► Submitting (new reference)
//!    │
//!  close() from Idle / Submitting / Failed ──► Closed (late results suppressed)
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{CheckoutRedirect, PaymentGateway};
use crate::notification::Notification;
use crate::reference::{ReferenceGenerator, TransactionReference};
use crate::request::{PaymentIntent, PaymentRequestBuilder};
use crate::validation::{validate, PaymentForm, ValidationRules};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const REDIRECT_NOTICE: &str = "Redirecting you to our secure payment partner…";

/// Configuration shared by every dialog: rules, reference prefix, payload defaults
#[derive(Debug, Clone)]
pub struct PaymentFlow {
    rules: ValidationRules,
    references: ReferenceGenerator,
    builder: PaymentRequestBuilder,
}

impl PaymentFlow {
    pub fn new(
        rules: ValidationRules,
        references: ReferenceGenerator,
        builder: PaymentRequestBuilder,
    ) -> Self {
        Self {
            rules,
            references,
            builder,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn builder(&self) -> &PaymentRequestBuilder {
        &self.builder
    }

    /// Validate, then generate a reference, then build the payload.
    ///
    /// A form that fails validation never reaches the reference generator.
    pub fn prepare(&self, form: &PaymentForm) -> PaymentResult<PaymentIntent> {
        let payment = validate(form, &self.rules).map_err(PaymentError::Validation)?;
        let reference = self.references.generate();
        self.builder.build(&payment, reference)
    }
}

/// Where a dialog instance stands
#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    /// Never submitted
    Idle,
    /// Request in flight; resubmission blocked
    Submitting { reference: TransactionReference },
    /// Gateway accepted; navigation to the checkout page is under way
    Redirecting { redirect: CheckoutRedirect },
    /// Last attempt failed; the form is editable again
    Failed { message: String },
    /// Dismissed by the payer
    Closed,
}

/// What the caller must show or do after a submit completes
#[derive(Debug)]
pub enum DialogOutcome {
    /// Navigate the whole page to `redirect.checkout_url`
    Redirect {
        redirect: CheckoutRedirect,
        notification: Notification,
    },
    /// Show `notification`; the form stays open
    Failed {
        error: PaymentError,
        notification: Notification,
    },
    /// The dialog was closed while the request was in flight
    Suppressed,
}

impl DialogOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            DialogOutcome::Redirect { notification, .. }
            | DialogOutcome::Failed { notification, .. } => Some(notification),
            DialogOutcome::Suppressed => None,
        }
    }
}

#[derive(Debug)]
pub struct PaymentDialog {
    id: Uuid,
    flow: Arc<PaymentFlow>,
    state: DialogState,
}

impl PaymentDialog {
    pub fn open(flow: Arc<PaymentFlow>) -> Self {
        let id = Uuid::new_v4();
        debug!(dialog_id = %id, "Payment dialog opened");
        Self {
            id,
            flow,
            state: DialogState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// True between submit and the end of the page (or a failure)
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            DialogState::Submitting { .. } | DialogState::Redirecting { .. }
        )
    }

    /// True when the payer may edit and submit
    pub fn is_editable(&self) -> bool {
        matches!(self.state, DialogState::Idle | DialogState::Failed { .. })
    }

    /// Synchronous half of a submit: everything before the network call.
    ///
    /// On success the dialog is `Submitting` and the returned intent carries
    /// a reference generated for this attempt only. Validation failures leave
    /// the state untouched.
    pub fn begin_submit(&mut self, form: &PaymentForm) -> PaymentResult<PaymentIntent> {
        match self.state {
            DialogState::Submitting { .. } | DialogState::Redirecting { .. } => {
                return Err(PaymentError::SubmissionInProgress)
            }
            DialogState::Closed => {
                return Err(PaymentError::InvalidState("dialog is closed".to_string()))
            }
            DialogState::Idle | DialogState::Failed { .. } => {}
        }

        let intent = self.flow.prepare(form)?;

        info!(
            dialog_id = %self.id,
            reference = %intent.reference,
            amount = intent.amount,
            currency = %intent.currency_id,
            purpose = %intent.purpose,
            "Submitting payment"
        );

        self.state = DialogState::Submitting {
            reference: intent.reference.clone(),
        };
        Ok(intent)
    }

    /// Apply the gateway result. Busy is cleared only on failure.
    pub fn finish(&mut self, result: PaymentResult<CheckoutRedirect>) -> DialogOutcome {
        let reference = match &self.state {
            DialogState::Submitting { reference } => reference.clone(),
            DialogState::Closed => {
                debug!(dialog_id = %self.id, "Gateway result arrived after close; ignoring");
                return DialogOutcome::Suppressed;
            }
            other => {
                warn!(dialog_id = %self.id, state = ?other, "Gateway result without a submission");
                return DialogOutcome::Suppressed;
            }
        };

        match result {
            Ok(redirect) => {
                info!(
                    dialog_id = %self.id,
                    reference = %reference,
                    "Gateway accepted payment; redirecting"
                );
                self.state = DialogState::Redirecting {
                    redirect: redirect.clone(),
                };
                DialogOutcome::Redirect {
                    redirect,
                    notification: Notification::info(REDIRECT_NOTICE),
                }
            }
            Err(error) => {
                let message = error.user_message();
                warn!(
                    dialog_id = %self.id,
                    reference = %reference,
                    error = %error,
                    "Payment initiation failed"
                );
                self.state = DialogState::Failed {
                    message: message.clone(),
                };
                DialogOutcome::Failed {
                    error,
                    notification: Notification::error(message),
                }
            }
        }
    }

    /// Run one full attempt against `gateway`.
    ///
    /// Every failure, local or remote, comes back as `DialogOutcome::Failed`
    /// with exactly one notification.
    pub async fn submit(
        &mut self,
        form: &PaymentForm,
        gateway: &dyn PaymentGateway,
    ) -> DialogOutcome {
        let intent = match self.begin_submit(form) {
            Ok(intent) => intent,
            Err(error) => {
                let notification = Notification::error(error.user_message());
                return DialogOutcome::Failed {
                    error,
                    notification,
                };
            }
        };

        let result = gateway.initiate(&intent).await;
        self.finish(result)
    }

    /// Dismiss the dialog. Not possible once the redirect has been issued.
    pub fn close(&mut self) -> PaymentResult<()> {
        if let DialogState::Redirecting { .. } = self.state {
            return Err(PaymentError::InvalidState(
                "redirect already issued".to_string(),
            ));
        }
        debug!(dialog_id = %self.id, "Payment dialog closed");
        self.state = DialogState::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackUrls;
    use crate::gateway::TransactionStatus;
    use crate::validation::Field;
    use crate::vocab::{Currency, PaymentMethod, PaymentPurpose};
    use crate::GatewayResponse;
    use async_trait::async_trait;
    use regex::Regex;
    use std::sync::Mutex;

    /// Gateway double that records every intent and replays scripted answers
    struct ScriptedGateway {
        answers: Mutex<Vec<PaymentResult<GatewayResponse>>>,
        seen: Mutex<Vec<PaymentIntent>>,
    }

    impl ScriptedGateway {
        fn new(answers: Vec<PaymentResult<GatewayResponse>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<PaymentIntent> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn initiate(&self, intent: &PaymentIntent) -> PaymentResult<CheckoutRedirect> {
            self.seen.lock().unwrap().push(intent.clone());
            let answer = self.answers.lock().unwrap().remove(0)?;
            answer.into_redirect(intent.reference.clone())
        }

        async fn verify(
            &self,
            reference: &TransactionReference,
        ) -> PaymentResult<TransactionStatus> {
            Err(PaymentError::TransactionNotFound {
                reference: reference.to_string(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn flow() -> Arc<PaymentFlow> {
        let urls = CallbackUrls::new("https://church.example").unwrap();
        Arc::new(PaymentFlow::new(
            ValidationRules::default(),
            ReferenceGenerator::new("PREFIX").unwrap(),
            PaymentRequestBuilder::new(urls),
        ))
    }

    fn jane(amount: &str) -> PaymentForm {
        PaymentForm::new("Jane Doe", "jane@example.com", amount)
    }

    fn accepted() -> PaymentResult<GatewayResponse> {
        Ok(GatewayResponse::Accepted {
            checkout_url: "https://gateway.example/checkout/abc".into(),
        })
    }

    #[tokio::test]
    async fn test_amount_below_minimum_never_reaches_gateway() {
        let gateway = ScriptedGateway::new(vec![accepted()]);
        let mut dialog = PaymentDialog::open(flow());

        let outcome = dialog.submit(&jane("50"), &gateway).await;

        match outcome {
            DialogOutcome::Failed { error, notification } => {
                match error {
                    PaymentError::Validation(errors) => {
                        assert_eq!(errors.len(), 1);
                        assert!(errors.has(Field::Amount));
                    }
                    other => panic!("unexpected error {:?}", other),
                }
                assert!(notification.message.contains("Minimum amount"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(gateway.calls().is_empty());
        assert_eq!(dialog.state(), &DialogState::Idle);
        assert!(!dialog.is_busy());
    }

    #[tokio::test]
    async fn test_valid_submission_builds_donation_payload() {
        let gateway = ScriptedGateway::new(vec![accepted()]);
        let mut dialog = PaymentDialog::open(flow());

        dialog.submit(&jane("5000"), &gateway).await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        let intent = &calls[0];
        let pattern = Regex::new(r"^PREFIX-\d+-[A-Z0-9]{6}$").unwrap();
        assert!(pattern.is_match(intent.reference.as_str()));
        assert_eq!(intent.purpose, PaymentPurpose::Donation);
        assert_eq!(intent.payment_method, PaymentMethod::Card);
        assert_eq!(intent.currency_id, Currency::NGN);
    }

    #[tokio::test]
    async fn test_gateway_rejection_reopens_form() {
        let gateway = ScriptedGateway::new(vec![Ok(GatewayResponse::Rejected {
            message: "card declined".into(),
        })]);
        let mut dialog = PaymentDialog::open(flow());

        let outcome = dialog.submit(&jane("5000"), &gateway).await;

        assert_eq!(outcome.notification().unwrap().message, "card declined");
        assert!(!dialog.is_busy());
        assert!(dialog.is_editable());
        assert_eq!(
            dialog.state(),
            &DialogState::Failed {
                message: "card declined".into()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_looks_like_rejection() {
        let gateway = ScriptedGateway::new(vec![Err(PaymentError::NetworkError(
            "connection reset".into(),
        ))]);
        let mut dialog = PaymentDialog::open(flow());

        let outcome = dialog.submit(&jane("5000"), &gateway).await;

        assert!(matches!(outcome, DialogOutcome::Failed { .. }));
        assert_eq!(
            outcome.notification().unwrap().message,
            crate::error::GENERIC_RETRY_MESSAGE
        );
        assert!(dialog.is_editable());
    }

    #[tokio::test]
    async fn test_accepted_redirects_to_exact_url_and_stays_busy() {
        let gateway = ScriptedGateway::new(vec![accepted()]);
        let mut dialog = PaymentDialog::open(flow());

        let outcome = dialog.submit(&jane("5000"), &gateway).await;

        match outcome {
            DialogOutcome::Redirect {
                redirect,
                notification,
            } => {
                assert_eq!(redirect.checkout_url, "https://gateway.example/checkout/abc");
                assert_eq!(notification.message, REDIRECT_NOTICE);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(dialog.is_busy());
        assert!(!dialog.is_editable());
        assert!(dialog.close().is_err());
    }

    #[tokio::test]
    async fn test_resubmission_after_failure_uses_new_reference() {
        let gateway = ScriptedGateway::new(vec![
            Ok(GatewayResponse::Rejected {
                message: "card declined".into(),
            }),
            accepted(),
        ]);
        let mut dialog = PaymentDialog::open(flow());

        dialog.submit(&jane("5000"), &gateway).await;
        dialog.submit(&jane("5000"), &gateway).await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].reference, calls[1].reference);
    }

    #[test]
    fn test_busy_flag_blocks_second_submit() {
        let mut dialog = PaymentDialog::open(flow());

        let intent = dialog.begin_submit(&jane("5000")).unwrap();
        assert!(dialog.is_busy());
        assert_eq!(
            dialog.state(),
            &DialogState::Submitting {
                reference: intent.reference.clone()
            }
        );

        let second = dialog.begin_submit(&jane("5000"));
        assert!(matches!(second, Err(PaymentError::SubmissionInProgress)));
    }

    #[test]
    fn test_close_while_in_flight_suppresses_result() {
        let mut dialog = PaymentDialog::open(flow());
        let intent = dialog.begin_submit(&jane("5000")).unwrap();

        dialog.close().unwrap();
        let outcome = dialog.finish(Ok(CheckoutRedirect {
            reference: intent.reference,
            checkout_url: "https://gateway.example/checkout/abc".into(),
        }));

        assert!(matches!(outcome, DialogOutcome::Suppressed));
        assert_eq!(dialog.state(), &DialogState::Closed);
        assert!(dialog.begin_submit(&jane("5000")).is_err());
    }

    #[test]
    fn test_close_before_submit_has_no_side_effects() {
        let mut dialog = PaymentDialog::open(flow());
        assert!(dialog.close().is_ok());
        assert!(!dialog.is_busy());
    }

    #[test]
    fn test_prepare_generates_distinct_references_for_identical_forms() {
        let flow = flow();
        let first = flow.prepare(&jane("5000")).unwrap();
        let second = flow.prepare(&jane("5000")).unwrap();
        assert_ne!(first.reference, second.reference);
    }
}
