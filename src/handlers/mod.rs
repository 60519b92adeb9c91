pub mod carts;
pub mod common;
pub mod orders;
pub mod payment_webhooks;
pub mod payments;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::payments::PaymentProvider;
use crate::repositories::{OrderRepository, OrderStore};
use crate::services::commerce::{
    CartResolver, CartStore, Catalog, CheckoutService, PaymentIntentService, SeaOrmCatalog,
    WebhookReconciler,
};
use crate::db::DbPool;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart_store: Arc<dyn CartStore>,
    pub catalog: Arc<dyn Catalog>,
    pub payment_intents: Arc<PaymentIntentService>,
    pub checkout: Arc<CheckoutService>,
    pub reconciler: Arc<WebhookReconciler>,
}

impl AppServices {
    /// Wire the services over a database pool, a cart store and a payment
    /// provider. Provider settings come from `config.payments`.
    pub fn new(
        db_pool: Arc<DbPool>,
        cart_store: Arc<dyn CartStore>,
        provider: Arc<dyn PaymentProvider>,
        config: &AppConfig,
    ) -> Self {
        let catalog: Arc<dyn Catalog> = Arc::new(SeaOrmCatalog::new(db_pool.clone()));
        let orders: Arc<dyn OrderStore> = Arc::new(OrderRepository::new(db_pool));
        Self::with_collaborators(cart_store, catalog, orders, provider, config)
    }

    /// Wire the services over explicit collaborators.
    pub fn with_collaborators(
        cart_store: Arc<dyn CartStore>,
        catalog: Arc<dyn Catalog>,
        orders: Arc<dyn OrderStore>,
        provider: Arc<dyn PaymentProvider>,
        config: &AppConfig,
    ) -> Self {
        let payments = &config.payments;

        let resolver = CartResolver::new(cart_store.clone(), catalog.clone());
        let payment_intents = Arc::new(PaymentIntentService::new(
            resolver,
            cart_store.clone(),
            provider,
            payments.currency.clone(),
        ));
        let checkout = Arc::new(CheckoutService::new(
            cart_store.clone(),
            catalog.clone(),
            orders.clone(),
        ));
        let reconciler = Arc::new(WebhookReconciler::new(
            orders,
            payments.webhook_secret.clone(),
            payments.webhook_tolerance(),
        ));

        Self {
            cart_store,
            catalog,
            payment_intents,
            checkout,
            reconciler,
        }
    }
}
