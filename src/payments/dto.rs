use serde::{Deserialize, Serialize};

use crate::{db::models::InsertOutcome, error::AppError};

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub price: f64,
}

impl IntentRequest {
    /// Price in minor currency units, truncated toward zero.
    pub fn amount_minor(&self) -> Result<i64, AppError> {
        let amount = (self.price * 100.0).trunc();
        if !amount.is_finite() || amount < 1.0 || amount > i64::MAX as f64 {
            return Err(AppError::BadRequest("price must be a positive amount".into()));
        }
        Ok(amount as i64)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// Payment confirmation as reported by the web client after a successful charge.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Defaults to the caller.
    pub email: Option<String>,
    pub price: f64,
    pub biodata_id: Option<i64>,
    pub transaction_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSaved {
    pub payment_result: InsertOutcome,
}
