pub mod cart;
pub mod order;

pub use cart::{CartLine, CartSnapshot};
pub use order::{
    CreateOrderRequest, DeliverySnapshot, Order, OrderItem, OrderResponse, PaymentSummary,
    ShippingAddress,
};
