pub mod stripe;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use stripe::StripeGateway;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Rejected(String),

    #[error("Payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

/// Hosted payment provider able to open a card payment intent.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// `amount` is in minor currency units (cents for `usd`).
    async fn create_intent(&self, amount: i64, currency: &str)
        -> Result<PaymentIntent, PaymentError>;
}

/// Convert a client-supplied price in major units to minor units, truncating
/// toward zero. Numeric strings are accepted the way a loosely typed client
/// sends them; anything else has no amount.
pub fn to_minor_units(price: &Value) -> Option<i64> {
    let major = match price {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let minor = (major * 100.0).trunc();
    minor.is_finite().then_some(minor as i64)
}
