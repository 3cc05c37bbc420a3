//! Product Model
//!
//! 商品主数据：价格、库存、剂量、有效期。
//! Invariant: `stock` never goes below zero after a committed mutation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::ProductCategory;
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Product entity (`products` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: f64,
    pub category: ProductCategory,
    #[serde(default)]
    pub requires_prescription: bool,
    /// Sellable units on hand
    pub stock: i64,
    /// Available dosage strengths, e.g. ["250mg", "500mg"]
    #[serde(default)]
    pub dosages: Vec<String>,
    /// Purpose tags, e.g. ["fever", "headache"]
    #[serde(default)]
    pub purposes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: String,
}

impl Product {
    /// Record key without the table prefix
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub unit_price: f64,
    pub category: ProductCategory,
    pub requires_prescription: Option<bool>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub dosages: Option<Vec<String>>,
    pub purposes: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
}

/// Update product payload, catalogue fields only.
///
/// Stock is deliberately absent: stock moves through restock/adjust so the
/// non-negative invariant is enforced in one place.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub unit_price: Option<f64>,
    pub category: Option<ProductCategory>,
    pub requires_prescription: Option<bool>,
    pub dosages: Option<Vec<String>>,
    pub purposes: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}
