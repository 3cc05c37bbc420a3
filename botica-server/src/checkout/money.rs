//! Pricing engine
//!
//! Pure, deterministic derivation of cart totals using rust_decimal for
//! precision. All calculations are done using `Decimal` internally, then
//! converted to `f64` for storage/serialization.
//!
//! Formula:
//! - subtotal = Σ(unit_price × quantity)
//! - discount = subtotal × rate (voucher rate when the code matches,
//!   otherwise the default 5%)
//! - tax = (subtotal − discount) × 12%
//! - total = (subtotal − discount) + tax

use rust_decimal::prelude::*;
use shared::{CartLine, PricingBreakdown};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Default discount applied when no valid voucher is present (5%)
pub const DEFAULT_DISCOUNT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Sales tax rate (12% VAT)
pub const TAX_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

/// The single recognized voucher code and its preferential rate
#[derive(Debug, Clone)]
pub struct VoucherPolicy {
    pub code: String,
    pub rate: f64,
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolve the discount rate for a submitted voucher code.
///
/// Matching is case-sensitive; a rejected code is not an error, it just
/// falls back to the default rate.
pub fn resolve_discount_rate(submitted: Option<&str>, policy: &VoucherPolicy) -> (Decimal, bool) {
    match submitted {
        Some(code) if code == policy.code => (to_decimal(policy.rate), true),
        _ => (DEFAULT_DISCOUNT_RATE, false),
    }
}

/// Derive all monetary totals for a set of cart lines.
///
/// An empty cart yields all zeros and must not raise an error.
pub fn price_cart(lines: &[CartLine], discount_rate: Decimal, voucher_applied: bool) -> PricingBreakdown {
    let subtotal: Decimal = lines
        .iter()
        .map(|l| to_decimal(l.unit_price) * Decimal::from(l.quantity))
        .sum();
    let subtotal = round_money(subtotal);

    let discount = round_money(subtotal * discount_rate);
    let taxable = subtotal - discount;
    let tax = round_money(taxable * TAX_RATE);
    let total = taxable + tax;

    PricingBreakdown {
        subtotal: to_f64(subtotal),
        discount_rate: discount_rate.to_f64().unwrap_or_default(),
        discount: to_f64(discount),
        tax: to_f64(tax),
        total: to_f64(total),
        voucher_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> VoucherPolicy {
        VoucherPolicy {
            code: "BOTICA10".to_string(),
            rate: 0.10,
        }
    }

    fn line(price: f64, quantity: i64) -> CartLine {
        CartLine {
            product_id: "p1".to_string(),
            name: "Item".to_string(),
            unit_price: price,
            quantity,
            dosage: None,
        }
    }

    #[test]
    fn test_default_rate_breakdown() {
        // [{price: 100, qty: 2}], no voucher
        let (rate, applied) = resolve_discount_rate(None, &policy());
        let pricing = price_cart(&[line(100.0, 2)], rate, applied);

        assert_eq!(pricing.subtotal, 200.0);
        assert_eq!(pricing.discount, 10.0); // 5%
        assert_eq!(pricing.tax, 22.8); // 190 × 0.12
        assert_eq!(pricing.total, 212.8);
        assert!(!pricing.voucher_applied);
    }

    #[test]
    fn test_voucher_rate_breakdown() {
        let (rate, applied) = resolve_discount_rate(Some("BOTICA10"), &policy());
        let pricing = price_cart(&[line(100.0, 2)], rate, applied);

        assert_eq!(pricing.discount, 20.0); // 10%
        assert_eq!(pricing.tax, 21.6); // 180 × 0.12
        assert_eq!(pricing.total, 201.6);
        assert!(pricing.voucher_applied);
    }

    #[test]
    fn test_voucher_is_case_sensitive() {
        let (rate, applied) = resolve_discount_rate(Some("botica10"), &policy());
        assert!(!applied);
        assert_eq!(rate, DEFAULT_DISCOUNT_RATE);
    }

    #[test]
    fn test_rejected_voucher_is_not_an_error() {
        let (rate, applied) = resolve_discount_rate(Some("EXPIRED"), &policy());
        let pricing = price_cart(&[line(100.0, 2)], rate, applied);
        assert_eq!(pricing.discount, 10.0);
        assert!(!pricing.voucher_applied);
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let (rate, applied) = resolve_discount_rate(None, &policy());
        let pricing = price_cart(&[], rate, applied);

        assert_eq!(pricing.subtotal, 0.0);
        assert_eq!(pricing.discount, 0.0);
        assert_eq!(pricing.tax, 0.0);
        assert_eq!(pricing.total, 0.0);
    }

    #[test]
    fn test_multiple_lines_accumulate() {
        let lines = vec![line(12.5, 4), line(3.25, 3)];
        let (rate, applied) = resolve_discount_rate(None, &policy());
        let pricing = price_cart(&lines, rate, applied);

        // subtotal = 50 + 9.75 = 59.75; discount = 2.99 (rounded); tax = 6.81
        assert_eq!(pricing.subtotal, 59.75);
        assert_eq!(pricing.discount, 2.99);
        assert_eq!(pricing.tax, 6.81);
        assert_eq!(pricing.total, 63.57);
    }

    #[test]
    fn test_decimal_precision_on_accumulation() {
        // 100 lines at 0.01 each; f64 would drift, Decimal must not
        let lines: Vec<CartLine> = (0..100).map(|_| line(0.01, 1)).collect();
        let pricing = price_cart(&lines, Decimal::ZERO, false);
        assert_eq!(pricing.subtotal, 1.0);
        assert_eq!(pricing.total, 1.12);
    }
}
