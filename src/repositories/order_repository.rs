use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::entities::order::{self, Column, Entity as OrderEntity, Model as OrderModel};
use crate::entities::order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel};
use crate::entities::OrderStatus;
use crate::errors::ServiceError;
use crate::models::{DeliverySnapshot, Order, OrderItem, PaymentSummary, ShippingAddress};
use crate::repositories::{OrderStore, Repository};

use super::BaseRepository;

/// sea-orm backed order store
#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn with_lines(&self, order: OrderModel) -> Result<Order, ServiceError> {
        let items = order
            .find_related(OrderItemEntity)
            .all(self.base.get_db())
            .await?;
        Ok(to_domain(order, items))
    }
}

fn to_domain(order: OrderModel, items: Vec<OrderItemModel>) -> Order {
    Order {
        id: order.id,
        buyer_email: order.buyer_email,
        order_date: order.order_date,
        shipping_address: ShippingAddress {
            name: order.ship_name,
            line1: order.ship_line1,
            line2: order.ship_line2,
            city: order.ship_city,
            state: order.ship_state,
            postal_code: order.ship_postal_code,
            country: order.ship_country,
        },
        delivery_method: DeliverySnapshot {
            id: order.delivery_method_id,
            short_name: order.delivery_short_name,
            delivery_time: order.delivery_time,
            price: order.delivery_price,
        },
        payment_summary: PaymentSummary {
            brand: order.card_brand,
            last4: order.card_last4,
            exp_month: order.card_exp_month,
            exp_year: order.card_exp_year,
        },
        items: items
            .into_iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                picture_url: item.picture_url,
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect(),
        subtotal: order.subtotal,
        status: order.status,
        payment_intent_id: order.payment_intent_id,
    }
}

fn to_active_models(order: &Order) -> (order::ActiveModel, Vec<order_item::ActiveModel>) {
    let row = order::ActiveModel {
        id: Set(order.id),
        buyer_email: Set(order.buyer_email.clone()),
        order_date: Set(order.order_date),
        ship_name: Set(order.shipping_address.name.clone()),
        ship_line1: Set(order.shipping_address.line1.clone()),
        ship_line2: Set(order.shipping_address.line2.clone()),
        ship_city: Set(order.shipping_address.city.clone()),
        ship_state: Set(order.shipping_address.state.clone()),
        ship_postal_code: Set(order.shipping_address.postal_code.clone()),
        ship_country: Set(order.shipping_address.country.clone()),
        delivery_method_id: Set(order.delivery_method.id),
        delivery_short_name: Set(order.delivery_method.short_name.clone()),
        delivery_time: Set(order.delivery_method.delivery_time.clone()),
        delivery_price: Set(order.delivery_method.price),
        card_brand: Set(order.payment_summary.brand.clone()),
        card_last4: Set(order.payment_summary.last4.clone()),
        card_exp_month: Set(order.payment_summary.exp_month),
        card_exp_year: Set(order.payment_summary.exp_year),
        subtotal: Set(order.subtotal),
        status: Set(order.status),
        payment_intent_id: Set(order.payment_intent_id.clone()),
    };

    let lines = order
        .items
        .iter()
        .map(|item| order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            product_name: Set(item.product_name.clone()),
            picture_url: Set(item.picture_url.clone()),
            unit_price: Set(item.unit_price),
            quantity: Set(item.quantity),
        })
        .collect();

    (row, lines)
}

#[async_trait]
impl OrderStore for OrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn save(&self, order: &Order) -> Result<(), ServiceError> {
        let (row, lines) = to_active_models(order);

        let persist = async {
            let txn = self.base.get_db().begin().await?;
            row.insert(&txn).await?;
            if !lines.is_empty() {
                OrderItemEntity::insert_many(lines).exec(&txn).await?;
            }
            txn.commit().await
        };

        // Dropping an uncommitted transaction rolls it back
        persist.await.map_err(|e| {
            error!(error = %e, "Failed to persist order");
            ServiceError::PersistenceFailed("order".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_payment_intent_id(
        &self,
        payment_intent_id: &str,
        include_lines: bool,
    ) -> Result<Option<Order>, ServiceError> {
        let found = OrderEntity::find()
            .filter(Column::PaymentIntentId.eq(payment_intent_id))
            .one(self.base.get_db())
            .await?;

        match found {
            Some(order) if include_lines => Ok(Some(self.with_lines(order).await?)),
            Some(order) => Ok(Some(to_domain(order, Vec::new()))),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_buyer_email(&self, buyer_email: &str) -> Result<Vec<Order>, ServiceError> {
        let rows = OrderEntity::find()
            .filter(Column::BuyerEmail.eq(buyer_email))
            .order_by_desc(Column::OrderDate)
            .find_with_related(OrderItemEntity)
            .all(self.base.get_db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(order, items)| to_domain(order, items))
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_for_buyer(
        &self,
        buyer_email: &str,
        order_id: Uuid,
    ) -> Result<Option<Order>, ServiceError> {
        let found = OrderEntity::find_by_id(order_id)
            .filter(Column::BuyerEmail.eq(buyer_email))
            .one(self.base.get_db())
            .await?;

        match found {
            Some(order) => Ok(Some(self.with_lines(order).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, ServiceError> {
        let result = OrderEntity::update_many()
            .col_expr(Column::Status, Expr::value(to))
            .filter(Column::Id.eq(order_id))
            .filter(Column::Status.eq(from))
            .exec(self.base.get_db())
            .await?;

        Ok(result.rows_affected == 1)
    }
}
