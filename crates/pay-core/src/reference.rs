//! # Transaction References
//!
//! References look like `PAY-1718123456789-K3X9QZ`: a business prefix, the
//! epoch milliseconds at generation, and six random uppercase alphanumerics.
//! There is no central counter; uniqueness is statistical.

use crate::error::{PaymentError, PaymentResult};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix used when none is configured
pub const DEFAULT_REFERENCE_PREFIX: &str = "PAY";

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 6;

/// Client-generated identifier correlating a payment attempt with the
/// gateway's transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

impl TransactionReference {
    /// Wrap an existing reference (e.g. from a status lookup URL)
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    prefix: String,
}

impl ReferenceGenerator {
    /// Create a generator; the prefix is uppercased and must be ASCII
    /// alphanumeric.
    pub fn new(prefix: impl Into<String>) -> PaymentResult<Self> {
        let prefix = prefix.into().trim().to_ascii_uppercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PaymentError::Configuration(format!(
                "reference prefix must be non-empty ASCII alphanumeric, got {:?}",
                prefix
            )));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh reference from the wall clock and thread RNG.
    pub fn generate(&self) -> TransactionReference {
        self.generate_with(Utc::now().timestamp_millis(), &mut rand::thread_rng())
    }

    /// Generate from an explicit timestamp and RNG.
    pub fn generate_with<R: Rng + ?Sized>(&self, epoch_ms: i64, rng: &mut R) -> TransactionReference {
        let suffix: String = rng
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b: u8| char::from(b).to_ascii_uppercase())
            .collect();

        TransactionReference(format!("{}-{}-{}", self.prefix, epoch_ms, suffix))
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
        }
    }
}
