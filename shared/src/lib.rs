//! Shared wire-contract types for the Botica storefront backend
//!
//! These types cross the boundary between botica-server and its clients
//! (storefront app, admin console), so they live outside the server crate:
//!
//! - **types** (`types`): payment methods, checkout status, product categories
//! - **cart** (`cart`): cart lines and pricing breakdowns
//! - **notification** (`notification`): store events and push payloads

pub mod cart;
pub mod notification;
pub mod types;

pub use cart::{CartLine, PricingBreakdown};
pub use notification::{PushNotification, StoreEvent};
pub use types::{CheckoutStatus, PaymentMethod, ProductCategory};
