mod buyer;

pub use buyer::BuyerIdentity;
