//! Core enumerations shared between server and clients

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method selected at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// 货到付款 / cash on delivery
    #[default]
    Cash,
    /// Hosted e-wallet checkout (redirect flow)
    Ewallet,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::Ewallet => write!(f, "EWALLET"),
        }
    }
}

/// Checkout status of an order
///
/// `AwaitingPayment` only exists for e-wallet orders between session creation
/// and the gateway callback; stock has NOT been reserved in that state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    AwaitingPayment,
    Processing,
    Confirmed,
}

impl CheckoutStatus {
    /// Whether a transition to `next` is allowed from the client-facing API.
    ///
    /// Only `Processing -> Confirmed` is externally drivable; the
    /// `AwaitingPayment -> Processing` step belongs to the checkout pipeline.
    pub fn can_transition_to(self, next: CheckoutStatus) -> bool {
        matches!(
            (self, next),
            (CheckoutStatus::Processing, CheckoutStatus::Confirmed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutStatus::AwaitingPayment => "AWAITING_PAYMENT",
            CheckoutStatus::Processing => "PROCESSING",
            CheckoutStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AWAITING_PAYMENT" => Ok(CheckoutStatus::AwaitingPayment),
            "PROCESSING" => Ok(CheckoutStatus::Processing),
            "CONFIRMED" => Ok(CheckoutStatus::Confirmed),
            other => Err(format!("unknown checkout status: {other}")),
        }
    }
}

/// Product category (fixed set maintained by the pharmacy)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    PainRelief,
    Antibiotics,
    VitaminsAndSupplements,
    CoughAndCold,
    FirstAid,
    PersonalCare,
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductCategory::PainRelief => "PAIN_RELIEF",
            ProductCategory::Antibiotics => "ANTIBIOTICS",
            ProductCategory::VitaminsAndSupplements => "VITAMINS_AND_SUPPLEMENTS",
            ProductCategory::CoughAndCold => "COUGH_AND_COLD",
            ProductCategory::FirstAid => "FIRST_AID",
            ProductCategory::PersonalCare => "PERSONAL_CARE",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_processing_to_confirmed_is_drivable() {
        assert!(CheckoutStatus::Processing.can_transition_to(CheckoutStatus::Confirmed));

        assert!(!CheckoutStatus::Confirmed.can_transition_to(CheckoutStatus::Processing));
        assert!(!CheckoutStatus::AwaitingPayment.can_transition_to(CheckoutStatus::Confirmed));
        assert!(!CheckoutStatus::Confirmed.can_transition_to(CheckoutStatus::Confirmed));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            CheckoutStatus::AwaitingPayment,
            CheckoutStatus::Processing,
            CheckoutStatus::Confirmed,
        ] {
            assert_eq!(status.as_str().parse::<CheckoutStatus>().unwrap(), status);
        }
    }
}
