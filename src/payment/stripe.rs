use async_trait::async_trait;
use serde::Deserialize;

use super::{PaymentError, PaymentGateway, PaymentIntent};
use crate::config::PaymentsConfig;

/// Stripe's Payment Intents API over form-encoded HTTPS.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let amount = amount.to_string();
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("Payment provider returned {}", status));
            return Err(PaymentError::Rejected(message));
        }

        Ok(response.json::<PaymentIntent>().await?)
    }
}
