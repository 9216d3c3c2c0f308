//! # Domain Types
//!
//! Core domain types used throughout SaleGuard.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │    SaleItem     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  product_id     │   │  id             │       │
//! │  │  date           │──►│  quantity       │   │  current_stock  │       │
//! │  │  customer_name  │   │  unit_price     │   │  track_inventory│       │
//! │  │  customer_cpf   │   └─────────────────┘   └─────────────────┘       │
//! │  │  total_cents    │                                                    │
//! │  │  session_id     │   ┌─────────────────┐                             │
//! │  │  payment_method │──►│ PaymentMethod   │                             │
//! │  └─────────────────┘   │  Cash, Pix, ... │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are owned by the surrounding application. The detector only reads
//! them; deletion happens in saleguard-db.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    #[default]
    Cash,
    /// Credit card on the store terminal.
    CreditCard,
    /// Debit card on the store terminal.
    DebitCard,
    /// Instant transfer.
    Pix,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Only `product_id` and `quantity` take part in duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Product identifier. Feeds that send `id` are accepted too.
    #[serde(alias = "id")]
    pub product_id: String,
    /// Product name at time of sale (frozen).
    #[serde(default)]
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    #[serde(default)]
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
    /// When the transaction happened.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Free text, may be empty.
    #[serde(default)]
    pub customer_name: String,
    /// Customer tax id (CPF), free text.
    #[serde(default)]
    pub customer_cpf: Option<String>,
    /// Total in cents.
    pub total_cents: i64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Cash-register session the sale was rung up in.
    #[serde(default)]
    pub session_id: Option<String>,
    pub items: Vec<SaleItem>,
}

fn default_tenant() -> String {
    crate::DEFAULT_TENANT_ID.to_string()
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Customer name as compared by the detector: trimmed and lowercased.
    ///
    /// ## Example
    /// ```rust
    /// # use saleguard_core::Sale;
    /// # let mut sale: Sale = serde_json::from_str(
    /// #     r#"{"id":"s1","date":"2026-01-01T10:00:00Z","totalCents":0,"items":[]}"#,
    /// # ).unwrap();
    /// sale.customer_name = "  João ".to_string();
    /// assert_eq!(sale.normalized_customer(), "joão");
    /// ```
    pub fn normalized_customer(&self) -> String {
        self.customer_name.trim().to_lowercase()
    }

    /// The CPF when present and non-empty.
    pub fn cpf(&self) -> Option<&str> {
        self.customer_cpf.as_deref().filter(|cpf| !cpf.is_empty())
    }

    /// Sum of line totals (unit price × quantity).
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }
}

// =============================================================================
// Product
// =============================================================================

/// An inventory record. Deleting a sale returns its quantities to stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Identifier, matched against [`SaleItem::product_id`].
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Whether to track inventory for this product.
    pub track_inventory: bool,

    /// Current stock level.
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_deserializes_from_feed_json() {
        let json = r#"{
            "id": "sale-1",
            "date": "2026-03-10T14:30:00.250Z",
            "customerName": "Maria Silva",
            "customerCpf": "123.456.789-09",
            "totalCents": 2000,
            "paymentMethod": "pix",
            "sessionId": "caixa-1",
            "items": [{ "id": "p1", "quantity": 2, "unitPriceCents": 1000 }]
        }"#;

        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.tenant_id, crate::DEFAULT_TENANT_ID);
        assert_eq!(sale.payment_method, PaymentMethod::Pix);
        assert_eq!(sale.items[0].product_id, "p1");
        assert_eq!(sale.items_total(), sale.total());
        assert_eq!(sale.date.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let json = r#"{"id":"s1","date":"yesterday","totalCents":0,"items":[]}"#;
        assert!(serde_json::from_str::<Sale>(json).is_err());
    }

    #[test]
    fn test_cpf_ignores_empty_string() {
        let json = r#"{"id":"s1","date":"2026-01-01T10:00:00Z","customerCpf":"","totalCents":0,"items":[]}"#;
        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.cpf(), None);
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"credit_card\""
        );
    }
}
