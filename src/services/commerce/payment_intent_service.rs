use std::sync::Arc;
use tracing::{info, instrument};

use super::cart_resolver::CartResolver;
use super::cart_store::CartStore;
use crate::errors::ServiceError;
use crate::models::CartSnapshot;
use crate::payments::PaymentProvider;

/// Keeps the provider authorization sized to the cart's current total.
#[derive(Clone)]
pub struct PaymentIntentService {
    resolver: CartResolver,
    cart_store: Arc<dyn CartStore>,
    provider: Arc<dyn PaymentProvider>,
    currency: String,
}

impl PaymentIntentService {
    pub fn new(
        resolver: CartResolver,
        cart_store: Arc<dyn CartStore>,
        provider: Arc<dyn PaymentProvider>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            cart_store,
            provider,
            currency: currency.into(),
        }
    }

    /// Creates an authorization for the cart, or resizes the existing one,
    /// and stores the updated cart.
    #[instrument(skip(self))]
    pub async fn create_or_update_intent(&self, cart_id: &str) -> Result<CartSnapshot, ServiceError> {
        let resolved = self.resolver.resolve(cart_id).await?;
        let amount_in_cents = resolved.amount_in_cents()?;
        let subtotal = resolved.subtotal;
        let delivery_price = resolved.delivery_price();
        let mut cart = resolved.cart;

        let intent = match cart.payment_intent() {
            None => {
                let intent = self
                    .provider
                    .create_authorization(amount_in_cents, &self.currency)
                    .await?;
                info!(
                    cart_id,
                    payment_intent_id = %intent.id,
                    subtotal = %subtotal,
                    delivery_price = %delivery_price,
                    amount_in_cents,
                    "Created payment intent"
                );
                metrics::counter!("payment_intents.created", 1);
                intent
            }
            Some(existing) => {
                let intent = self
                    .provider
                    .update_authorization(existing, amount_in_cents)
                    .await?;
                info!(
                    cart_id,
                    payment_intent_id = %intent.id,
                    subtotal = %subtotal,
                    delivery_price = %delivery_price,
                    amount_in_cents,
                    "Updated payment intent"
                );
                metrics::counter!("payment_intents.updated", 1);
                intent
            }
        };

        cart.payment_intent_id = Some(intent.id);
        cart.client_secret = Some(intent.client_secret);
        cart.amount_in_cents = Some(amount_in_cents);

        self.cart_store.put(&cart).await?;
        Ok(cart)
    }
}
