//! # Gateway Configuration
//!
//! Configuration for the payment-initiation API.
//! Values are loaded from environment variables.

use pay_core::PaymentError;
use std::env;
use std::time::Duration;

pub const DEFAULT_INITIATE_PATH: &str = "/api/payments/initiate";
pub const DEFAULT_VERIFY_PATH: &str = "/api/payments/verify";

/// Payment API configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// API base URL (e.g., "https://api.church.example")
    pub base_url: String,

    /// Bearer token, if the API requires one
    pub api_token: Option<String>,

    /// Path of the initiation endpoint
    pub initiate_path: String,

    /// Path prefix of the status lookup endpoint; the reference is appended
    pub verify_path: String,

    /// Request timeout; `None` keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYMENT_API_BASE_URL`
    ///
    /// Optional:
    /// - `PAYMENT_API_TOKEN`
    /// - `PAYMENT_INITIATE_PATH`
    /// - `PAYMENT_VERIFY_PATH`
    /// - `PAYMENT_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("PAYMENT_API_BASE_URL").map_err(|_| {
            PaymentError::Configuration("PAYMENT_API_BASE_URL not set".to_string())
        })?;

        let timeout = match env::var("PAYMENT_API_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                PaymentError::Configuration(format!(
                    "PAYMENT_API_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?)),
            Err(_) => None,
        };

        let config = Self {
            base_url,
            api_token: env::var("PAYMENT_API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            initiate_path: env::var("PAYMENT_INITIATE_PATH")
                .unwrap_or_else(|_| DEFAULT_INITIATE_PATH.to_string()),
            verify_path: env::var("PAYMENT_VERIFY_PATH")
                .unwrap_or_else(|_| DEFAULT_VERIFY_PATH.to_string()),
            timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit base URL (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            initiate_path: DEFAULT_INITIATE_PATH.to_string(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            timeout: None,
        }
    }

    /// Builder: set bearer token
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(PaymentError::Configuration(
                "PAYMENT_API_BASE_URL must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of the initiation endpoint
    pub fn initiate_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.initiate_path)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> Option<String> {
        self.api_token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("initiate_path", &self.initiate_path)
            .field("verify_path", &self.verify_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate_url() {
        let config = GatewayConfig::new("https://api.church.example/");
        assert_eq!(
            config.initiate_url(),
            "https://api.church.example/api/payments/initiate"
        );
    }

    #[test]
    fn test_auth_header() {
        let config = GatewayConfig::new("https://api.church.example");
        assert!(config.auth_header().is_none());

        let config = config.with_api_token("tok_abc123");
        assert_eq!(config.auth_header().as_deref(), Some("Bearer tok_abc123"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = GatewayConfig::new("https://api.church.example").with_api_token("tok_secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("tok_secret"));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(GatewayConfig::new("https://api.church.example").validate().is_ok());
        assert!(GatewayConfig::new("api.church.example").validate().is_err());
    }

    #[test]
    fn test_from_env_missing_base_url() {
        env::remove_var("PAYMENT_API_BASE_URL");

        let result = GatewayConfig::from_env();
        assert!(result.is_err());
    }
}
