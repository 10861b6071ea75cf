//! # Payment Request Builder
//!
//! Pure assembly of the payload sent to the payment-initiation endpoint.

use crate::callback::CallbackUrls;
use crate::error::PaymentResult;
use crate::reference::TransactionReference;
use crate::validation::ValidatedPayment;
use crate::vocab::{Currency, PaymentMethod, PaymentPurpose};
use serde::{Deserialize, Serialize};

/// `entryId` for payments not tied to a ledger entry (donations, general giving)
pub const GENERAL_ENTRY_ID: i64 = 0;

/// A fully-specified payment attempt, serialized as the gateway wire payload.
///
/// Lives only for the duration of one submit; nothing persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub entry_id: i64,
    /// Major currency units
    pub amount: f64,
    pub currency_id: Currency,
    pub name: String,
    pub email: String,
    /// May be empty
    #[serde(default)]
    pub phone_number: String,
    pub reference: TransactionReference,
    pub purpose: PaymentPurpose,
    pub payment_method: PaymentMethod,
    pub callback_url: String,
}

/// Builds [`PaymentIntent`]s from validated form state and fixed vocabularies
#[derive(Debug, Clone)]
pub struct PaymentRequestBuilder {
    urls: CallbackUrls,
    currency: Currency,
    purpose: PaymentPurpose,
    method: PaymentMethod,
    entry_id: i64,
}

impl PaymentRequestBuilder {
    /// Public donation flow: NGN, donation, card, no ledger entry
    pub fn new(urls: CallbackUrls) -> Self {
        Self {
            urls,
            currency: Currency::default(),
            purpose: PaymentPurpose::default(),
            method: PaymentMethod::default(),
            entry_id: GENERAL_ENTRY_ID,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_purpose(mut self, purpose: PaymentPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Bind payments to a ledger entry (e.g. a pledge line on a finance report)
    pub fn for_entry(mut self, entry_id: i64) -> Self {
        self.entry_id = entry_id;
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn purpose(&self) -> PaymentPurpose {
        self.purpose
    }

    pub fn urls(&self) -> &CallbackUrls {
        &self.urls
    }

    pub fn build(
        &self,
        payment: &ValidatedPayment,
        reference: TransactionReference,
    ) -> PaymentResult<PaymentIntent> {
        Ok(PaymentIntent {
            entry_id: self.entry_id,
            amount: payment.amount(),
            currency_id: self.currency,
            name: payment.name().to_string(),
            email: payment.email().to_string(),
            phone_number: payment.phone().to_string(),
            reference,
            purpose: self.purpose,
            payment_method: self.method,
            callback_url: self.urls.success_url()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, PaymentForm, ValidationRules};

    fn builder() -> PaymentRequestBuilder {
        PaymentRequestBuilder::new(CallbackUrls::new("https://church.example").unwrap())
    }

    fn validated() -> ValidatedPayment {
        let form = PaymentForm::new("Jane Doe", "jane@example.com", "5000");
        validate(&form, &ValidationRules::default()).unwrap()
    }

    #[test]
    fn test_donation_payload() {
        let reference = TransactionReference::new("PAY-1718123456789-ABC123");
        let intent = builder().build(&validated(), reference.clone()).unwrap();

        assert_eq!(intent.entry_id, GENERAL_ENTRY_ID);
        assert_eq!(intent.amount, 5000.0);
        assert_eq!(intent.reference, reference);
        assert_eq!(intent.callback_url, "https://church.example/payments?payment=success");
    }

    #[test]
    fn test_wire_shape() {
        let reference = TransactionReference::new("PAY-1-AAAAAA");
        let intent = builder().build(&validated(), reference).unwrap();
        let json = serde_json::to_value(&intent).unwrap();

        assert_eq!(json["entryId"], 0);
        assert_eq!(json["amount"], 5000.0);
        assert_eq!(json["currencyId"], "NGN");
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["phoneNumber"], "");
        assert_eq!(json["reference"], "PAY-1-AAAAAA");
        assert_eq!(json["purpose"], "DON");
        assert_eq!(json["paymentMethod"], "Card");
        assert_eq!(json["callbackUrl"], "https://church.example/payments?payment=success");
        assert_eq!(json.as_object().unwrap().len(), 10);
    }

    #[test]
    fn test_ledger_bound_tithe() {
        let intent = builder()
            .with_purpose(PaymentPurpose::Tithe)
            .with_method(PaymentMethod::Transfer)
            .for_entry(42)
            .build(&validated(), TransactionReference::new("PAY-1-AAAAAA"))
            .unwrap();

        assert_eq!(intent.entry_id, 42);
        assert_eq!(intent.purpose, PaymentPurpose::Tithe);
        assert_eq!(intent.payment_method, PaymentMethod::Transfer);
    }
}
