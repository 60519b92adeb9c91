use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Bob Bobbity")]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "10 The Street")]
    pub line1: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "New York")]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "NY")]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    #[schema(example = "90250")]
    pub postal_code: String,
    #[validate(length(min = 2, max = 56))]
    #[schema(example = "US")]
    pub country: String,
}

/// Display-only card details. Never carries a full card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    #[validate(length(min = 1, max = 32))]
    #[schema(example = "visa")]
    pub brand: String,
    #[validate(custom = "validate_last4")]
    #[schema(example = "4242")]
    pub last4: String,
    #[validate(range(min = 1, max = 12))]
    #[schema(example = 12)]
    pub exp_month: i32,
    #[validate(range(min = 2000, max = 9999))]
    #[schema(example = 2030)]
    pub exp_year: i32,
}

fn validate_last4(last4: &str) -> Result<(), ValidationError> {
    if last4.len() == 4 && last4.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("last4_must_be_four_digits"))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "basket-1")]
    pub cart_id: String,
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub delivery_method_id: i32,
    #[validate]
    pub shipping_address: ShippingAddress,
    #[validate]
    pub payment_summary: PaymentSummary,
}

/// Delivery method as it was when the order was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySnapshot {
    pub id: i32,
    pub short_name: String,
    pub delivery_time: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i32,
    pub product_name: String,
    pub picture_url: Option<String>,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An order together with its line snapshots. The total is derived on demand
/// from `subtotal` and the delivery snapshot and is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub buyer_email: String,
    pub order_date: DateTime<Utc>,
    pub shipping_address: ShippingAddress,
    pub delivery_method: DeliverySnapshot,
    pub payment_summary: PaymentSummary,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub status: OrderStatus,
    pub payment_intent_id: String,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.subtotal + self.delivery_method.price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_email: String,
    pub order_date: DateTime<Utc>,
    pub ship_to_address: ShippingAddress,
    pub delivery_method: String,
    pub shipping_price: Decimal,
    pub payment_summary: PaymentSummary,
    pub order_items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_intent_id: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self {
            id: order.id,
            buyer_email: order.buyer_email,
            order_date: order.order_date,
            ship_to_address: order.shipping_address,
            delivery_method: order.delivery_method.short_name,
            shipping_price: order.delivery_method.price,
            payment_summary: order.payment_summary,
            order_items: order.items,
            subtotal: order.subtotal,
            total,
            status: order.status,
            payment_intent_id: order.payment_intent_id,
        }
    }
}
