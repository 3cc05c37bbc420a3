//! Cart line items and pricing breakdowns
//!
//! A `CartLine` is the unit shared by carts and order snapshots: once an
//! order is created the lines are a frozen copy, so later price or stock
//! changes never alter order history.

use serde::{Deserialize, Serialize};

/// One product entry in a shopper's cart (or in an order snapshot)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product record key (without table prefix)
    pub product_id: String,
    /// Product name snapshot
    pub name: String,
    /// Unit price captured when the line was added
    pub unit_price: f64,
    /// Quantity, always > 0 (a line reduced to zero is removed)
    pub quantity: i64,
    /// Selected dosage, e.g. "500mg"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
}

impl CartLine {
    /// Lines merge when product and dosage both match
    pub fn merges_with(&self, product_id: &str, dosage: Option<&str>) -> bool {
        self.product_id == product_id && self.dosage.as_deref() == dosage
    }
}

/// Derived monetary totals for a cart
///
/// Produced by the pricing engine; all values are rounded to 2 decimal
/// places. An empty cart yields all zeros.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PricingBreakdown {
    pub subtotal: f64,
    /// Applied discount rate (voucher rate or the default)
    pub discount_rate: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    /// Whether a submitted voucher code was accepted
    #[serde(default)]
    pub voucher_applied: bool,
}
