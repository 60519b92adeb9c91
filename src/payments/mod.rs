//! Payment provider integration: the provider trait consumed by the commerce
//! services, the Stripe HTTP client, webhook signature checks and event
//! payload types.

pub mod events;
pub mod signature;
pub mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub use events::{ProviderEvent, SettlementEvent};
pub use signature::{construct_event, SignatureError, SIGNATURE_HEADER};
pub use stripe::StripeClient;

/// Authorization state returned by the provider after a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIntent {
    pub id: String,
    pub client_secret: String,
    /// Authorized amount in minor units
    pub amount: i64,
}

/// Authorization calls against the payment provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a new authorization for `amount_cents` in `currency`.
    async fn create_authorization(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<ProviderIntent, ServiceError>;

    /// Resizes an existing authorization. Calling it with the current amount
    /// is a no-op on the provider side.
    async fn update_authorization(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<ProviderIntent, ServiceError>;
}
