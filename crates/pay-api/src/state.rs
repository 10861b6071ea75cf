//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment gateway, the payment flow configuration, and the
//! callback reconciler.

use pay_core::{
    BoxedPaymentGateway, CallbackReconciler, CallbackUrls, Currency, PaymentFlow, PaymentMethod,
    PaymentPurpose, PaymentRequestBuilder, ReferenceGenerator, ValidationRules,
};
use pay_gateway::HttpGateway;
use serde::Deserialize;
use std::sync::Arc;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public origin used for the gateway callback URL
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// `LOG_FORMAT=json` switches to structured logs
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Payment rules loaded from `config/payments.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSettings {
    /// Smallest accepted amount, in major units
    #[serde(default = "default_minimum_amount")]
    pub minimum_amount: f64,

    /// Business prefix of transaction references
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub purpose: PaymentPurpose,

    #[serde(default)]
    pub method: PaymentMethod,

    /// Route the gateway returns to
    #[serde(default = "default_payments_path")]
    pub payments_path: String,

    /// Seconds the redirect acknowledgment stays up before navigating
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_secs: u64,

    #[serde(default)]
    pub success_message: Option<String>,

    #[serde(default)]
    pub failure_message: Option<String>,
}

fn default_minimum_amount() -> f64 {
    pay_core::validation::DEFAULT_MINIMUM_AMOUNT
}

fn default_reference_prefix() -> String {
    pay_core::reference::DEFAULT_REFERENCE_PREFIX.to_string()
}

fn default_payments_path() -> String {
    pay_core::callback::DEFAULT_PAYMENTS_PATH.to_string()
}

fn default_redirect_delay() -> u64 {
    1
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            minimum_amount: default_minimum_amount(),
            reference_prefix: default_reference_prefix(),
            currency: Currency::default(),
            purpose: PaymentPurpose::default(),
            method: PaymentMethod::default(),
            payments_path: default_payments_path(),
            redirect_delay_secs: default_redirect_delay(),
            success_message: None,
            failure_message: None,
        }
    }
}

impl PaymentSettings {
    /// Reject settings the router or the gateway could not work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.minimum_amount.is_finite() || self.minimum_amount <= 0.0 {
            anyhow::bail!("minimum_amount must be a positive number");
        }
        if !self.payments_path.starts_with('/')
            || self.payments_path.contains('?')
            || self.payments_path.contains('#')
        {
            anyhow::bail!(
                "payments_path must be an absolute path without query or fragment, got {:?}",
                self.payments_path
            );
        }
        if self.payments_path.starts_with("/api/") || self.payments_path == "/health" {
            anyhow::bail!("payments_path {:?} collides with a built-in route", self.payments_path);
        }
        Ok(())
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway client
    pub gateway: BoxedPaymentGateway,
    /// Validation rules, reference generator and payload defaults
    pub flow: Arc<PaymentFlow>,
    /// Return-marker reconciler for the payments page
    pub reconciler: Arc<CallbackReconciler>,
    /// Payment settings
    pub settings: Arc<PaymentSettings>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the HTTP gateway from environment
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let settings = load_payment_settings()?;

        let gateway = HttpGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize payment gateway: {}", e))?;

        Self::with_gateway(config, settings, Arc::new(gateway))
    }

    /// Assemble state around an existing gateway
    pub fn with_gateway(
        config: AppConfig,
        settings: PaymentSettings,
        gateway: BoxedPaymentGateway,
    ) -> anyhow::Result<Self> {
        settings.validate()?;

        let urls = CallbackUrls::new(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid BASE_URL: {}", e))?
            .with_payments_path(settings.payments_path.clone());

        let references = ReferenceGenerator::new(settings.reference_prefix.clone())
            .map_err(|e| anyhow::anyhow!("Invalid reference_prefix: {}", e))?;

        let builder = PaymentRequestBuilder::new(urls)
            .with_currency(settings.currency)
            .with_purpose(settings.purpose)
            .with_method(settings.method);

        let rules = ValidationRules {
            minimum_amount: settings.minimum_amount,
            currency: settings.currency,
        };

        let mut reconciler = CallbackReconciler::new();
        if let Some(message) = &settings.success_message {
            reconciler = reconciler.with_success_message(message.clone());
        }
        if let Some(message) = &settings.failure_message {
            reconciler = reconciler.with_failure_message(message.clone());
        }

        Ok(Self {
            gateway,
            flow: Arc::new(PaymentFlow::new(rules, references, builder)),
            reconciler: Arc::new(reconciler),
            settings: Arc::new(settings),
            config,
        })
    }

    pub fn payments_path(&self) -> &str {
        &self.settings.payments_path
    }
}

/// Load payment settings from config file
fn load_payment_settings() -> anyhow::Result<PaymentSettings> {
    let config_paths = [
        "config/payments.toml",
        "../config/payments.toml",
        "../../config/payments.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let settings: PaymentSettings = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded payment settings from {}", path);
            return Ok(settings);
        }
    }

    tracing::warn!("No payment settings found, using defaults");
    Ok(PaymentSettings::default())
}
