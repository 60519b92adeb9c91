use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::OrderStatus;
use crate::errors::ServiceError;
use crate::models::Order;

pub mod order_repository;

pub use order_repository::OrderRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Order persistence used by the checkout and reconciliation services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the order row and all of its lines atomically. Any failure
    /// leaves nothing behind and yields `ServiceError::PersistenceFailed`.
    async fn save(&self, order: &Order) -> Result<(), ServiceError>;

    async fn find_by_payment_intent_id(
        &self,
        payment_intent_id: &str,
        include_lines: bool,
    ) -> Result<Option<Order>, ServiceError>;

    /// Orders placed by `buyer_email`, newest first, with lines.
    async fn find_by_buyer_email(&self, buyer_email: &str) -> Result<Vec<Order>, ServiceError>;

    async fn find_for_buyer(
        &self,
        buyer_email: &str,
        order_id: Uuid,
    ) -> Result<Option<Order>, ServiceError>;

    /// Moves `order_id` from `from` to `to` only if it is still in `from`.
    /// Returns whether a row changed.
    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, ServiceError>;
}
