use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{PaymentProvider, ProviderIntent};
use crate::config::PaymentConfig;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Payment intents over the Stripe REST API (form-encoded, bearer auth).
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    pub fn new(cfg: &PaymentConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            secret_key: cfg.secret_key.clone(),
        })
    }

    async fn post_intent(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ProviderIntent, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling payment provider");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Payment provider unreachable");
                ServiceError::ExternalServiceError(format!("payment provider unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<StripeErrorBody>().await {
                Ok(body) => body
                    .error
                    .message
                    .or(body.error.kind)
                    .unwrap_or_else(|| status.to_string()),
                Err(_) => status.to_string(),
            };
            warn!(%status, %message, "Payment provider rejected request");
            metrics::counter!("payment_provider.errors", 1, "status" => status.as_u16().to_string());
            return Err(ServiceError::ExternalServiceError(message));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("unexpected provider response: {}", e))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            ServiceError::ExternalServiceError("provider response missing client_secret".into())
        })?;

        Ok(ProviderIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    #[instrument(skip(self))]
    async fn create_authorization(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<ProviderIntent, ServiceError> {
        self.post_intent(
            "/v1/payment_intents",
            &[
                ("amount", amount_cents.to_string()),
                ("currency", currency.to_lowercase()),
                ("payment_method_types[]", "card".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn update_authorization(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<ProviderIntent, ServiceError> {
        self.post_intent(
            &format!("/v1/payment_intents/{}", intent_id),
            &[("amount", amount_cents.to_string())],
        )
        .await
    }
}
