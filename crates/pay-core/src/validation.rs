//! # Payment Form Validation
//!
//! Checks payer identity and amount before anything touches the network.
//! Every field is checked independently so callers can show one message or
//! all of them; nothing is cached between submit attempts.

use crate::vocab::Currency;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default minimum payment, in major currency units
pub const DEFAULT_MINIMUM_AMOUNT: f64 = 100.0;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// Plain digits, or digits grouped in threes by commas, with optional decimals
fn amount_pattern() -> &'static Regex {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    AMOUNT.get_or_init(|| {
        Regex::new(r"^(?:\d+|\d{1,3}(?:,\d{3})+)(?:\.\d+)?$")
            .expect("amount pattern is a valid regex")
    })
}

/// Raw form state as typed by the payer.
///
/// `amount` stays a string until validation so that "abc" or "" can be
/// reported instead of silently becoming zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "amount_from_text_or_number")]
    pub amount: String,
}

/// JSON clients may send `"amount": 5000` as well as `"amount": "5000"`
fn amount_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> serde::de::Visitor<'de> for AmountVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("an amount as a string or number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

impl PaymentForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            amount: amount.into(),
        }
    }

    /// Builder: set phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

/// Business rules applied by [`validate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    /// Smallest accepted amount, in major units
    pub minimum_amount: f64,
    /// Currency used when formatting messages
    pub currency: Currency,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            minimum_amount: DEFAULT_MINIMUM_AMOUNT,
            currency: Currency::NGN,
        }
    }
}

/// Form field a validation message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Amount,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Amount => "amount",
        }
    }
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All failed rules, in form order (name, email, amount)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// The message a toast-style UI shows
    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field.as_str(), e.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

/// Form state that passed every rule.
///
/// Only [`validate`] constructs this, which keeps reference generation
/// behind the validation gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPayment {
    name: String,
    email: String,
    phone: String,
    amount: f64,
}

impl ValidatedPayment {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Trimmed phone number, empty when not given
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Amount in major currency units
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Validate a payment form against the rules.
pub fn validate(
    form: &PaymentForm,
    rules: &ValidationRules,
) -> Result<ValidatedPayment, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = form.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new(Field::Name, "Please enter your full name"));
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Please enter your email address"));
    } else if !email_pattern().is_match(email) {
        errors.push(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ));
    }

    let amount = match parse_amount(&form.amount) {
        Some(amount) if amount <= 0.0 => {
            errors.push(FieldError::new(
                Field::Amount,
                "Amount must be greater than zero",
            ));
            None
        }
        Some(amount) if amount < rules.minimum_amount => {
            errors.push(FieldError::new(
                Field::Amount,
                format!(
                    "Minimum amount is {}",
                    rules.currency.format_amount(rules.minimum_amount)
                ),
            ));
            None
        }
        Some(amount) => Some(amount),
        None => {
            errors.push(FieldError::new(Field::Amount, "Please enter a valid amount"));
            None
        }
    };

    match amount {
        Some(amount) if errors.is_empty() => Ok(ValidatedPayment {
            name: name.to_string(),
            email: email.to_string(),
            phone: form.phone.trim().to_string(),
            amount,
        }),
        _ => Err(errors),
    }
}

/// Parse a typed amount. Commas are accepted only as thousands grouping,
/// so "100,50" is rejected rather than read as 10050.
fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !amount_pattern().is_match(raw) {
        return None;
    }
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn test_valid_form() {
        let form = PaymentForm::new("  Jane Doe ", "jane@example.com", "5000")
            .with_phone(" 08030000000 ");
        let payment = validate(&form, &rules()).unwrap();

        assert_eq!(payment.name(), "Jane Doe");
        assert_eq!(payment.email(), "jane@example.com");
        assert_eq!(payment.phone(), "08030000000");
        assert_eq!(payment.amount(), 5000.0);
    }

    #[test]
    fn test_amount_below_minimum() {
        let form = PaymentForm::new("Jane Doe", "jane@example.com", "50");
        let errors = validate(&form, &rules()).unwrap_err();

        assert_eq!(errors.len(), 1);
        let first = errors.first().unwrap();
        assert_eq!(first.field, Field::Amount);
        assert_eq!(first.message, "Minimum amount is ₦100.00");
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let form = PaymentForm::new("Jane Doe", "jane@example.com", "100");
        assert!(validate(&form, &rules()).is_ok());
    }

    #[test]
    fn test_all_rules_report_independently() {
        let form = PaymentForm::new("   ", "not-an-email", "abc");
        let errors = validate(&form, &rules()).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.has(Field::Name));
        assert!(errors.has(Field::Email));
        assert!(errors.has(Field::Amount));
        assert_eq!(errors.first().unwrap().field, Field::Name);
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["", "jane", "jane@", "jane@example", "@example.com", "ja ne@example.com"] {
            let form = PaymentForm::new("Jane", bad, "500");
            let errors = validate(&form, &rules()).unwrap_err();
            assert!(errors.has(Field::Email), "accepted {:?}", bad);
        }

        let form = PaymentForm::new("Jane", "jane.doe+gifts@mail.example.org", "500");
        assert!(validate(&form, &rules()).is_ok());
    }

    #[test]
    fn test_non_finite_and_non_positive_amounts() {
        for bad in ["", "NaN", "inf", "-inf", "0", "-200", "1e400"] {
            let form = PaymentForm::new("Jane", "jane@example.com", bad);
            let errors = validate(&form, &rules()).unwrap_err();
            assert!(errors.has(Field::Amount), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_thousands_separator() {
        let form = PaymentForm::new("Jane", "jane@example.com", "10,000");
        assert_eq!(validate(&form, &rules()).unwrap().amount(), 10000.0);

        let form = PaymentForm::new("Jane", "jane@example.com", "1,250,000.50");
        assert_eq!(validate(&form, &rules()).unwrap().amount(), 1_250_000.5);
    }

    #[test]
    fn test_misplaced_commas_are_rejected() {
        for bad in ["100,50", "1,5000", "5,,000", ",500,", "1000,000", "5,000."] {
            let form = PaymentForm::new("Jane", "jane@example.com", bad);
            let errors = validate(&form, &rules()).unwrap_err();
            let error = errors.get(Field::Amount).unwrap();
            assert_eq!(error.message, "Please enter a valid amount", "input {:?}", bad);
        }
    }

    #[test]
    fn test_amount_accepts_json_number_or_text() {
        let form: PaymentForm =
            serde_json::from_str(r#"{"name":"Jane","email":"jane@example.com","amount":5000}"#)
                .unwrap();
        assert_eq!(form.amount, "5000");

        let form: PaymentForm = serde_json::from_str(r#"{"amount":2500.5}"#).unwrap();
        assert_eq!(form.amount, "2500.5");

        let form: PaymentForm = serde_json::from_str(r#"{"amount":"1,000"}"#).unwrap();
        assert_eq!(form.amount, "1,000");

        let form: PaymentForm = serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert!(form.amount.is_empty());

        assert!(serde_json::from_str::<PaymentForm>(r#"{"amount":[1]}"#).is_err());
    }

    #[test]
    fn test_custom_minimum() {
        let rules = ValidationRules {
            minimum_amount: 1000.0,
            currency: Currency::NGN,
        };
        let form = PaymentForm::new("Jane", "jane@example.com", "500");
        let errors = validate(&form, &rules).unwrap_err();
        assert_eq!(errors.first().unwrap().message, "Minimum amount is ₦1,000.00");
    }
}
