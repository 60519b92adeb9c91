use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::cart_resolver::{apply_catalog_prices, load_products, MissingProduct};
use super::cart_store::CartStore;
use super::catalog::Catalog;
use super::money::to_minor_units;
use crate::entities::OrderStatus;
use crate::errors::ServiceError;
use crate::models::{CreateOrderRequest, DeliverySnapshot, Order, OrderItem};
use crate::repositories::OrderStore;

/// Turns a paid-for cart into an order.
#[derive(Clone)]
pub struct CheckoutService {
    cart_store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    orders: Arc<dyn OrderStore>,
}

impl CheckoutService {
    pub fn new(
        cart_store: Arc<dyn CartStore>,
        catalog: Arc<dyn Catalog>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            cart_store,
            catalog,
            orders,
        }
    }

    /// Builds and persists an order from the cart named in `request`.
    ///
    /// Preconditions are checked before any write: the cart exists, it has a
    /// payment intent, every product still exists and the delivery method
    /// exists. Line prices come from the catalog, not from the cart.
    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    pub async fn create_order(
        &self,
        buyer_email: &str,
        request: CreateOrderRequest,
    ) -> Result<Order, ServiceError> {
        let cart = self
            .cart_store
            .get(&request.cart_id)
            .await?
            .ok_or_else(|| ServiceError::CartNotFound(request.cart_id.clone()))?;

        let payment_intent_id = cart
            .payment_intent()
            .ok_or_else(|| ServiceError::NoPaymentIntent(request.cart_id.clone()))?
            .to_string();

        if let Some(existing) = self.existing_order(buyer_email, &payment_intent_id).await? {
            return Ok(existing);
        }

        let products = load_products(self.catalog.as_ref(), &cart.items).await?;
        let cart = apply_catalog_prices(cart, &products)
            .map_err(|MissingProduct(id)| ServiceError::ProductUnavailable(id))?;

        let delivery_method = self
            .catalog
            .get_delivery_method_by_id(request.delivery_method_id)
            .await?
            .ok_or(ServiceError::InvalidDeliveryMethod(request.delivery_method_id))?;

        let items: Vec<OrderItem> = cart
            .items
            .into_iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: line.product_name,
                picture_url: line.picture_url,
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();
        let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();

        let order = Order {
            id: Uuid::new_v4(),
            buyer_email: buyer_email.to_string(),
            order_date: Utc::now(),
            shipping_address: request.shipping_address,
            delivery_method: DeliverySnapshot {
                id: delivery_method.id,
                short_name: delivery_method.short_name,
                delivery_time: delivery_method.delivery_time,
                price: delivery_method.price,
            },
            payment_summary: request.payment_summary,
            items,
            subtotal,
            status: OrderStatus::Pending,
            payment_intent_id,
        };

        let total_in_cents = to_minor_units(order.total())?;

        if let Err(err) = self.orders.save(&order).await {
            // A concurrent request for the same intent may have won the unique index
            if let Some(existing) = self
                .existing_order(buyer_email, &order.payment_intent_id)
                .await?
            {
                return Ok(existing);
            }
            metrics::counter!("orders.persist_failed", 1);
            return Err(err);
        }

        info!(
            order_id = %order.id,
            payment_intent_id = %order.payment_intent_id,
            subtotal = %order.subtotal,
            delivery_price = %order.delivery_method.price,
            total_in_cents,
            "Order created"
        );
        metrics::counter!("orders.created", 1);

        Ok(order)
    }

    async fn existing_order(
        &self,
        buyer_email: &str,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, ServiceError> {
        match self
            .orders
            .find_by_payment_intent_id(payment_intent_id, true)
            .await?
        {
            Some(order) if order.buyer_email == buyer_email => {
                info!(order_id = %order.id, "Order already exists for payment intent");
                Ok(Some(order))
            }
            Some(order) => {
                warn!(
                    order_id = %order.id,
                    payment_intent_id,
                    "Payment intent already belongs to another buyer's order"
                );
                Err(ServiceError::PersistenceFailed("order".to_string()))
            }
            None => Ok(None),
        }
    }

    /// Orders placed by the buyer, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_buyer(&self, buyer_email: &str) -> Result<Vec<Order>, ServiceError> {
        self.orders.find_by_buyer_email(buyer_email).await
    }

    #[instrument(skip(self))]
    pub async fn order_for_buyer(
        &self,
        buyer_email: &str,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        self.orders
            .find_for_buyer(buyer_email, order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }
}
