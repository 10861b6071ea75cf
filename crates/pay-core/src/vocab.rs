//! # Payment Vocabularies
//!
//! Closed sets of codes sent to the gateway. Each enum serializes to the
//! exact wire code the gateway expects, so a typo is a compile error rather
//! than a rejected request.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(alias = "ngn")]
    NGN,
    #[serde(alias = "usd")]
    USD,
    #[serde(alias = "gbp")]
    GBP,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::NGN => "NGN",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::NGN => "₦",
            Currency::USD => "$",
            Currency::GBP => "£",
        }
    }

    /// Format a major-unit amount for display (e.g., "₦5,000.00")
    pub fn format_amount(&self, amount: f64) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{}{}{}.{}", sign, self.symbol(), grouped, fraction)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::NGN
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification code the gateway uses for reporting.
///
/// Unrelated to whether the payment succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentPurpose {
    #[serde(rename = "DON", alias = "donation")]
    Donation,
    #[serde(rename = "TTH", alias = "tithe")]
    Tithe,
    #[serde(rename = "OFF", alias = "offering")]
    Offering,
}

impl PaymentPurpose {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentPurpose::Donation => "DON",
            PaymentPurpose::Tithe => "TTH",
            PaymentPurpose::Offering => "OFF",
        }
    }

    /// Human label for page headings
    pub fn label(&self) -> &'static str {
        match self {
            PaymentPurpose::Donation => "Donation",
            PaymentPurpose::Tithe => "Tithe",
            PaymentPurpose::Offering => "Offering",
        }
    }
}

impl Default for PaymentPurpose {
    fn default() -> Self {
        PaymentPurpose::Donation
    }
}

impl std::fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// How the payer settles on the gateway's checkout page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Card", alias = "card")]
    Card,
    #[serde(rename = "Transfer", alias = "transfer")]
    Transfer,
    #[serde(rename = "USSD", alias = "ussd")]
    Ussd,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Ussd => "USSD",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
