use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::catalog::Catalog;
use super::cart_store::CartStore;
use super::money::{to_minor_units, MoneyError};
use crate::entities::{delivery_method, product};
use crate::errors::ServiceError;
use crate::models::{CartLine, CartSnapshot};

/// Product id referenced by a cart line that the catalog no longer has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingProduct(pub i32);

/// A cart whose lines carry current catalog prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCart {
    pub cart: CartSnapshot,
    pub delivery_method: Option<delivery_method::Model>,
    pub subtotal: Decimal,
}

impl ResolvedCart {
    pub fn delivery_price(&self) -> Decimal {
        self.delivery_method
            .as_ref()
            .map(|method| method.price)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.subtotal + self.delivery_price()
    }

    pub fn amount_in_cents(&self) -> Result<i64, MoneyError> {
        to_minor_units(self.total())
    }
}

/// Overwrites every line price with the catalog price.
///
/// Pure over its inputs so the intent and order paths can each apply it to
/// whatever catalog state they observe.
pub fn apply_catalog_prices(
    mut cart: CartSnapshot,
    products: &HashMap<i32, product::Model>,
) -> Result<CartSnapshot, MissingProduct> {
    for line in cart.items.iter_mut() {
        let product = products
            .get(&line.product_id)
            .ok_or(MissingProduct(line.product_id))?;
        if line.unit_price != product.price {
            debug!(
                product_id = line.product_id,
                stored = %line.unit_price,
                current = %product.price,
                "Repricing cart line"
            );
            line.unit_price = product.price;
        }
    }
    Ok(cart)
}

/// Fetches the catalog entries referenced by `lines`. Missing products are
/// absent from the map.
pub async fn load_products(
    catalog: &dyn Catalog,
    lines: &[CartLine],
) -> Result<HashMap<i32, product::Model>, ServiceError> {
    let mut products = HashMap::with_capacity(lines.len());
    for line in lines {
        if products.contains_key(&line.product_id) {
            continue;
        }
        if let Some(product) = catalog.get_product_by_id(line.product_id).await? {
            products.insert(product.id, product);
        }
    }
    Ok(products)
}

/// Loads a cart and reprices it against the catalog.
#[derive(Clone)]
pub struct CartResolver {
    cart_store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
}

impl CartResolver {
    pub fn new(cart_store: Arc<dyn CartStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            cart_store,
            catalog,
        }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, cart_id: &str) -> Result<ResolvedCart, ServiceError> {
        let cart = self
            .cart_store
            .get(cart_id)
            .await?
            .ok_or_else(|| ServiceError::CartNotFound(cart_id.to_string()))?;

        let products = load_products(self.catalog.as_ref(), &cart.items).await?;
        let cart = apply_catalog_prices(cart, &products)
            .map_err(|MissingProduct(id)| ServiceError::InvalidCartLine(id))?;

        let delivery_method = match cart.delivery_method_id {
            Some(id) => Some(
                self.catalog
                    .get_delivery_method_by_id(id)
                    .await?
                    .ok_or(ServiceError::InvalidDeliveryMethod(id))?,
            ),
            None => None,
        };

        let subtotal = cart.subtotal();
        Ok(ResolvedCart {
            cart,
            delivery_method,
            subtotal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::commerce::cart_store::InMemoryCartStore;
    use crate::services::commerce::catalog::MockCatalog;
    use assert_matches::assert_matches;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn product(id: i32, price: Decimal) -> product::Model {
        product::Model {
            id,
            name: format!("Product {id}"),
            description: None,
            price,
            picture_url: None,
            brand: None,
            product_type: None,
        }
    }

    fn line(product_id: i32, price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            product_id,
            product_name: format!("Product {product_id}"),
            picture_url: None,
            unit_price: price,
            quantity,
        }
    }

    fn ups() -> delivery_method::Model {
        delivery_method::Model {
            id: 1,
            short_name: "UPS1".into(),
            delivery_time: "1-2 Days".into(),
            description: "Fastest delivery time".into(),
            price: dec!(5.00),
        }
    }

    #[test]
    fn apply_catalog_prices_overwrites_stale_prices() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(1, dec!(1.00), 2));
        let products = HashMap::from([(1, product(1, dec!(12.00)))]);

        let repriced = apply_catalog_prices(cart, &products).unwrap();
        assert_eq!(repriced.items[0].unit_price, dec!(12.00));
        assert_eq!(repriced.subtotal(), dec!(24.00));
    }

    #[test]
    fn apply_catalog_prices_reports_missing_product() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(1, dec!(1.00), 1));
        cart.items.push(line(9, dec!(1.00), 1));
        let products = HashMap::from([(1, product(1, dec!(1.00)))]);

        assert_eq!(
            apply_catalog_prices(cart, &products),
            Err(MissingProduct(9))
        );
    }

    async fn store_with(cart: CartSnapshot) -> Arc<InMemoryCartStore> {
        let store = Arc::new(InMemoryCartStore::new());
        store.put(&cart).await.unwrap();
        store
    }

    #[tokio::test]
    async fn resolve_computes_scenario_amount() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(1, dec!(15.00), 3));
        cart.delivery_method_id = Some(1);
        let store = store_with(cart).await;

        let mut catalog = MockCatalog::new();
        catalog
            .expect_get_product_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(product(id, dec!(19.99)))));
        catalog
            .expect_get_delivery_method_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(ups())));

        let resolver = CartResolver::new(store, Arc::new(catalog));
        let resolved = resolver.resolve("c1").await.unwrap();

        assert_eq!(resolved.subtotal, dec!(59.97));
        assert_eq!(resolved.total(), dec!(64.97));
        assert_eq!(resolved.amount_in_cents(), Ok(6497));
        assert_eq!(resolved.cart.items[0].unit_price, dec!(19.99));
    }

    #[tokio::test]
    async fn resolve_without_delivery_method_has_zero_shipping() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(1, dec!(10.00), 1));
        let store = store_with(cart).await;

        let mut catalog = MockCatalog::new();
        catalog
            .expect_get_product_by_id()
            .returning(|id| Ok(Some(product(id, dec!(10.00)))));
        catalog.expect_get_delivery_method_by_id().never();

        let resolver = CartResolver::new(store, Arc::new(catalog));
        let resolved = resolver.resolve("c1").await.unwrap();
        assert_eq!(resolved.delivery_price(), Decimal::ZERO);
        assert_eq!(resolved.amount_in_cents(), Ok(1000));
    }

    #[tokio::test]
    async fn resolve_fails_for_unknown_cart() {
        let resolver = CartResolver::new(
            Arc::new(InMemoryCartStore::new()),
            Arc::new(MockCatalog::new()),
        );
        assert_matches!(
            resolver.resolve("missing").await,
            Err(ServiceError::CartNotFound(id)) if id == "missing"
        );
    }

    #[tokio::test]
    async fn resolve_fails_for_removed_product() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(4, dec!(10.00), 1));
        let store = store_with(cart).await;

        let mut catalog = MockCatalog::new();
        catalog.expect_get_product_by_id().returning(|_| Ok(None));

        let resolver = CartResolver::new(store, Arc::new(catalog));
        assert_matches!(
            resolver.resolve("c1").await,
            Err(ServiceError::InvalidCartLine(4))
        );
    }

    #[tokio::test]
    async fn resolve_fails_for_unknown_delivery_method() {
        let mut cart = CartSnapshot::new("c1");
        cart.items.push(line(1, dec!(10.00), 1));
        cart.delivery_method_id = Some(42);
        let store = store_with(cart).await;

        let mut catalog = MockCatalog::new();
        catalog
            .expect_get_product_by_id()
            .returning(|id| Ok(Some(product(id, dec!(10.00)))));
        catalog
            .expect_get_delivery_method_by_id()
            .returning(|_| Ok(None));

        let resolver = CartResolver::new(store, Arc::new(catalog));
        assert_matches!(
            resolver.resolve("c1").await,
            Err(ServiceError::InvalidDeliveryMethod(42))
        );
    }
}
