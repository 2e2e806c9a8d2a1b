use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PaymentConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize payment client: {0}")]
    Initialization(String),
    #[error("Payment processor unreachable: {0}")]
    Transport(String),
    #[error("Payment processor rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not deserialize payment processor response: {0}")]
    Json(String),
}

/// Outbound side of a charge: asks the processor for a payment intent and hands the
/// client secret back untouched.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_minor: i64) -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
    currency: String,
}

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64) -> Result<String, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = amount_minor.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", self.currency.as_str()),
            ("payment_method_types[]", "card"),
        ];
        debug!(amount_minor, currency = %self.currency, "creating payment intent");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            return Err(GatewayError::Rejected { status, message });
        }

        let intent = response
            .json::<IntentResponse>()
            .await
            .map_err(|e| GatewayError::Json(e.to_string()))?;
        info!(amount_minor, "payment intent created");
        Ok(intent.client_secret)
    }
}
