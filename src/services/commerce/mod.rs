/// Commerce services module - cart pricing, payment intents, orders and
/// payment reconciliation
pub mod cart_resolver;
pub mod cart_store;
pub mod catalog;
pub mod checkout_service;
pub mod money;
pub mod payment_intent_service;
pub mod webhook_reconciler;

// Re-export services for convenience
pub use cart_resolver::{CartResolver, ResolvedCart};
pub use cart_store::{CartStore, InMemoryCartStore, RedisCartStore};
pub use catalog::{Catalog, SeaOrmCatalog};
pub use checkout_service::CheckoutService;
pub use payment_intent_service::PaymentIntentService;
pub use webhook_reconciler::{ReconcileOutcome, WebhookReconciler};
