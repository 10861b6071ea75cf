//! # HTTP Gateway Client
//!
//! Implementation of `PaymentGateway` over the church payment REST API.
//! One POST per initiation, no automatic retry.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use pay_core::{
    CheckoutData, CheckoutRedirect, GatewayEnvelope, PaymentError, PaymentGateway, PaymentIntent,
    PaymentResult, TransactionReference, TransactionStatus, VerifyData,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const PROVIDER: &str = "church-api";

/// Gateway client for the payment-initiation API
pub struct HttpGateway {
    config: GatewayConfig,
    client: Client,
}

impl HttpGateway {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> PaymentResult<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = GatewayConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_header() {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    fn verify_url(&self, reference: &TransactionReference) -> PaymentResult<Url> {
        let base = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.verify_path
        );
        let mut url = Url::parse(&base).map_err(|e| {
            PaymentError::Configuration(format!("invalid verify URL {:?}: {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::Configuration(format!("verify URL {} has no path", base)))?
            .pop_if_empty()
            .push(reference.as_str());
        Ok(url)
    }

    async fn read_body(response: reqwest::Response) -> PaymentResult<(StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    #[instrument(skip(self, intent), fields(reference = %intent.reference))]
    async fn initiate(&self, intent: &PaymentIntent) -> PaymentResult<CheckoutRedirect> {
        let url = self.config.initiate_url();
        debug!("Initiating payment at {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(intent)
            .send()
            .await
            .map_err(|e| {
                error!("Payment API unreachable: {}", e);
                PaymentError::NetworkError(e.to_string())
            })?;

        let (status, body) = Self::read_body(response).await?;

        // Error statuses may still carry a `{status:false,message}` envelope
        let envelope: GatewayEnvelope<CheckoutData> =
            serde_json::from_str(&body).map_err(|e| {
                error!("Unparseable payment API response: status={}, error={}", status, e);
                PaymentError::Serialization(format!(
                    "Failed to parse payment API response (HTTP {}): {}",
                    status, e
                ))
            })?;

        if !status.is_success() {
            warn!("Payment API answered HTTP {}", status);
        }

        let redirect = envelope
            .into_response()?
            .into_redirect(intent.reference.clone())?;

        info!("Payment initiated: reference={}", redirect.reference);
        Ok(redirect)
    }

    #[instrument(skip(self), fields(reference = %reference))]
    async fn verify(&self, reference: &TransactionReference) -> PaymentResult<TransactionStatus> {
        let url = self.verify_url(reference)?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(PaymentError::TransactionNotFound {
                reference: reference.to_string(),
            });
        }

        let envelope: GatewayEnvelope<VerifyData> = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!(
                "Failed to parse status response (HTTP {}): {}",
                status, e
            ))
        })?;

        let result = envelope.into_status(reference.clone())?;
        debug!("Transaction state: {:?}", result.state);
        Ok(result)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
