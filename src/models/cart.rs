use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One line of a shopper's cart. `unit_price` is whatever the client or a
/// previous repricing last stored; it is overwritten from the catalog before
/// any amount is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[validate(range(min = 1))]
    #[schema(example = 7)]
    pub product_id: i32,
    #[validate(length(min = 1))]
    #[schema(example = "Angular Speedster Board 2000")]
    pub product_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(rename = "price")]
    #[schema(example = "19.99")]
    pub unit_price: Decimal,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 3)]
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Mutable cart state held in the cart store, including the payment intent
/// record (`payment_intent_id`, `client_secret`, `amount_in_cents`) last
/// agreed with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "basket-1",
    "items": [{"productId": 7, "productName": "Blue Hat", "price": "19.99", "quantity": 3}],
    "deliveryMethodId": 1,
    "paymentIntentId": "pi_3Nabc",
    "clientSecret": "pi_3Nabc_secret_xyz",
    "amountInCents": 6497
}))]
pub struct CartSnapshot {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[serde(default)]
    #[validate]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub delivery_method_id: Option<i32>,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub amount_in_cents: Option<i64>,
}

impl CartSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            delivery_method_id: None,
            payment_intent_id: None,
            client_secret: None,
            amount_in_cents: None,
        }
    }

    /// Sum of `unit_price * quantity` over the stored lines.
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }

    /// Returns the provider intent id when one has been established.
    pub fn payment_intent(&self) -> Option<&str> {
        self.payment_intent_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
