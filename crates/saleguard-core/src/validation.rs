//! # Validation Module
//!
//! Input validation applied before a sale is written to the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Field types, timestamp parsing                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - Business rule validation                       │
//! │  ├── ids, quantities, prices, sizes                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use saleguard_core::validation::{validate_quantity, validate_price_cents};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_price_cents(-1).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, Sale};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest customer name accepted.
pub const MAX_CUSTOMER_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a quantity value: must be in `1..=MAX_ITEM_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents. Zero is allowed (free items, fully
/// discounted sales).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a customer name. Empty is allowed (walk-in customer).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    if name.trim().chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a required identifier (any non-blank string).
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Sale Validator
// =============================================================================

/// Validates a whole sale before it is persisted.
///
/// Sale ids come from the upstream feed and are not required to be UUIDs.
pub fn validate_sale(sale: &Sale) -> CoreResult<()> {
    validate_required("id", &sale.id)?;
    validate_required("tenant_id", &sale.tenant_id)?;
    validate_customer_name(&sale.customer_name)?;
    validate_price_cents(sale.total_cents)?;

    if sale.items.is_empty() {
        return Err(CoreError::invalid_sale(&sale.id, "sale has no items"));
    }

    if sale.items.len() > MAX_SALE_ITEMS {
        return Err(CoreError::invalid_sale(
            &sale.id,
            format!("sale has more than {MAX_SALE_ITEMS} items"),
        ));
    }

    for item in &sale.items {
        validate_required("product_id", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_price_cents)?;
    }

    Ok(())
}

/// Validates a product from the catalogue feed.
///
/// Product ids only need to match the `product_id` of sale lines, so any
/// non-blank string is accepted.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required("id", &product.id)?;
    validate_required("tenant_id", &product.tenant_id)?;
    validate_required("sku", &product.sku)?;
    validate_price_cents(product.price_cents)?;

    if let Some(stock) = product.current_stock {
        if stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "current_stock".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SaleItem};
    use chrono::Utc;

    fn valid_sale() -> Sale {
        Sale {
            id: "sale-1".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            date: Utc::now(),
            customer_name: "Maria Silva".to_string(),
            customer_cpf: None,
            total_cents: 2000,
            payment_method: PaymentMethod::Cash,
            session_id: None,
            items: vec![SaleItem {
                product_id: "p1".to_string(),
                name_snapshot: "Arroz 5kg".to_string(),
                unit_price_cents: 1000,
                quantity: 2,
            }],
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("").is_ok());
        assert!(validate_customer_name("José da Silva").is_ok());
        assert!(validate_customer_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_product() {
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            tenant_id: "t".to_string(),
            sku: "ARROZ-5KG".to_string(),
            name: "Arroz 5kg".to_string(),
            price_cents: 2500,
            track_inventory: true,
            current_stock: Some(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_product(&product).is_ok());

        let mut no_sku = product.clone();
        no_sku.sku = " ".to_string();
        assert!(validate_product(&no_sku).is_err());

        let mut no_id = product.clone();
        no_id.id.clear();
        assert!(validate_product(&no_id).is_err());

        let mut negative = product;
        negative.current_stock = Some(-1);
        assert!(validate_product(&negative).is_err());
    }

    #[test]
    fn test_validate_sale() {
        assert!(validate_sale(&valid_sale()).is_ok());

        let mut no_items = valid_sale();
        no_items.items.clear();
        assert!(matches!(
            validate_sale(&no_items),
            Err(CoreError::InvalidSale { .. })
        ));

        let mut blank_id = valid_sale();
        blank_id.id = "  ".to_string();
        assert!(matches!(
            validate_sale(&blank_id),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let mut bad_qty = valid_sale();
        bad_qty.items[0].quantity = 0;
        assert!(validate_sale(&bad_qty).is_err());

        let mut negative_total = valid_sale();
        negative_total.total_cents = -1;
        assert!(validate_sale(&negative_total).is_err());
    }
}
