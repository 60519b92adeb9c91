pub mod delivery_method;
pub mod order;
pub mod order_item;
pub mod product;

pub use order::OrderStatus;
