use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::CartSnapshot;

/// Storage for shopper carts keyed by cart id. Writes are last-writer-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>, ServiceError>;

    async fn put(&self, cart: &CartSnapshot) -> Result<(), ServiceError>;

    /// Returns whether a cart was removed.
    async fn delete(&self, cart_id: &str) -> Result<bool, ServiceError>;
}

fn cart_key(cart_id: &str) -> String {
    format!("cart:{}", cart_id)
}

/// Carts stored as JSON blobs in Redis with a sliding TTL
#[derive(Clone)]
pub struct RedisCartStore {
    client: Arc<redis::Client>,
    ttl: Duration,
}

impl RedisCartStore {
    pub fn new(client: Arc<redis::Client>, ttl: Duration) -> Self {
        Self { client, ttl }
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    #[instrument(skip(self))]
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>, ServiceError> {
        let mut conn = self.client.get_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(cart_key(cart_id))
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    async fn put(&self, cart: &CartSnapshot) -> Result<(), ServiceError> {
        let json = serde_json::to_string(cart)?;
        let mut conn = self.client.get_async_connection().await?;
        redis::cmd("SETEX")
            .arg(cart_key(&cart.id))
            .arg(self.ttl.as_secs())
            .arg(json)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Cart stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, cart_id: &str) -> Result<bool, ServiceError> {
        let mut conn = self.client.get_async_connection().await?;
        let removed: i64 = redis::cmd("DEL")
            .arg(cart_key(cart_id))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}

/// Process-local cart store for tests and single-node development.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<DashMap<String, CartSnapshot>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>, ServiceError> {
        Ok(self.carts.get(cart_id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, cart: &CartSnapshot) -> Result<(), ServiceError> {
        self.carts.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn delete(&self, cart_id: &str) -> Result<bool, ServiceError> {
        Ok(self.carts.remove(cart_id).is_some())
    }
}
