//! Typed document models
//!
//! Every record crossing the store boundary is deserialized into one of
//! these structs; malformed documents fail at the boundary instead of
//! leaking undefined fields into the pipeline.

pub mod cart;
pub mod device_token;
pub mod order;
pub mod product;
pub mod serde_helpers;

pub use cart::Cart;
pub use device_token::DeviceToken;
pub use order::Order;
pub use product::{Product, ProductCreate, ProductUpdate};
