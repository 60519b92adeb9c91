use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::{delivery_method, product};
use crate::errors::ServiceError;

/// Read-only access to authoritative prices and delivery options.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_product_by_id(&self, id: i32) -> Result<Option<product::Model>, ServiceError>;

    async fn get_delivery_method_by_id(
        &self,
        id: i32,
    ) -> Result<Option<delivery_method::Model>, ServiceError>;

    async fn list_delivery_methods(&self) -> Result<Vec<delivery_method::Model>, ServiceError>;
}

/// Catalog backed by the `products` and `delivery_methods` tables
#[derive(Clone)]
pub struct SeaOrmCatalog {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Catalog for SeaOrmCatalog {
    #[instrument(skip(self))]
    async fn get_product_by_id(&self, id: i32) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find_by_id(id).one(&*self.db).await?)
    }

    #[instrument(skip(self))]
    async fn get_delivery_method_by_id(
        &self,
        id: i32,
    ) -> Result<Option<delivery_method::Model>, ServiceError> {
        Ok(delivery_method::Entity::find_by_id(id).one(&*self.db).await?)
    }

    async fn list_delivery_methods(&self) -> Result<Vec<delivery_method::Model>, ServiceError> {
        Ok(delivery_method::Entity::find()
            .order_by_desc(delivery_method::Column::Price)
            .all(&*self.db)
            .await?)
    }
}
