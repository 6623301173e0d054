//! Strongly-typed destination records.
//!
//! These are the shapes handed to the destination store. Primary keys never
//! appear here on insert; the store generates them and returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product row ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Catalog category.
    pub category: String,
    /// Whether the product is currently stocked.
    pub in_stock: bool,
    /// Free-form labels; empty when the source had none.
    pub tags: Vec<String>,
}

/// Postal address stored as a JSON column on the user row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line.
    #[serde(default)]
    pub street: String,
    /// City name.
    #[serde(default)]
    pub city: String,
    /// Postal code.
    #[serde(default)]
    pub zip_code: String,
}

/// A user row ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    /// Full name.
    pub name: String,
    /// Email address, unique in the destination store.
    pub email: String,
    /// Age in years, when the source recorded one.
    pub age: Option<i32>,
    /// Postal address, when the source recorded one.
    pub address: Option<Address>,
    /// Account creation time; migration time when the source had none.
    pub created_at: DateTime<Utc>,
}

/// One line item on an order.
///
/// `product_id` normally holds a destination product key. When the source
/// referenced a product that was never migrated, the raw source identifier
/// is carried through instead; consumers must tolerate foreign identifiers
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Destination product key, or a raw source id in degraded mode.
    pub product_id: String,
    /// Units ordered.
    #[serde(default)]
    pub quantity: i64,
}

/// An order row ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Destination user key; absent when the source had no user or the
    /// reference could not be resolved.
    pub user_id: Option<String>,
    /// Line items, in source order.
    pub items: Vec<OrderItem>,
    /// Order total.
    pub total: f64,
    /// Fulfillment status.
    pub status: String,
    /// Time the order was placed; migration time when the source had none.
    pub order_date: DateTime<Utc>,
}

/// Result of a find-by-primary-key lookup on the users table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Destination primary key.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
}
