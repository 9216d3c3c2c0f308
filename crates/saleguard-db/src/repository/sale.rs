//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. IMPORT                                                             │
//! │     └── insert_recorded() → sales row + sale_items rows                │
//! │     └── (stock untouched: upstream already deducted it)                │
//! │                                                                         │
//! │  2. SCAN                                                               │
//! │     └── list_by_tenant() → Vec<Sale> with items, oldest first          │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE DUPLICATE                                        │
//! │     └── delete_sale() → stock restored, sale + items removed           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use saleguard_core::validation::validate_sale;
use saleguard_core::{PaymentMethod, Sale, SaleItem};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    tenant_id: String,
    sold_at: DateTime<Utc>,
    customer_name: String,
    customer_cpf: Option<String>,
    total_cents: i64,
    payment_method: PaymentMethod,
    session_id: Option<String>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            tenant_id: self.tenant_id,
            date: self.sold_at,
            customer_name: self.customer_name,
            customer_cpf: self.customer_cpf,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            session_id: self.session_id,
            items,
        }
    }
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    name_snapshot: String,
    unit_price_cents: i64,
    quantity: i64,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            product_id: row.product_id,
            name_snapshot: row.name_snapshot,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
        }
    }
}

const SALE_COLUMNS: &str = r#"
    id, tenant_id, sold_at, customer_name, customer_cpf,
    total_cents, payment_method, session_id
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID, with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(row.into_sale(items)))
    }

    /// Gets the items of a sale in line order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_id, product_id, name_snapshot, unit_price_cents, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleItem::from).collect())
    }

    /// Loads every sale of a tenant with its items, oldest first.
    ///
    /// The whole history is materialized; there is no pagination.
    pub async fn list_by_tenant(&self, tenant_id: &str) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE tenant_id = ?1 ORDER BY sold_at, id"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.sale_id, si.product_id, si.name_snapshot, si.unit_price_cents, si.quantity
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.tenant_id = ?1
            ORDER BY si.sale_id, si.line_no
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items_by_sale
                .entry(row.sale_id.clone())
                .or_default()
                .push(SaleItem::from(row));
        }

        let mut sales: Vec<Sale> = rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect();

        // sold_at is RFC 3339 text with variable fractional digits, so text
        // order is not always chronological
        sales.sort_by_key(|sale| sale.date);

        info!(tenant_id = %tenant_id, count = sales.len(), "Loaded sales");
        Ok(sales)
    }

    /// Counts sales for a tenant.
    pub async fn count_by_tenant(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Records a sale that already happened upstream, with its items.
    ///
    /// Stock is not touched: the register deducted it when the sale was
    /// made. Only [`SaleRepository::delete_sale`] moves stock. Sale and
    /// items are written in one transaction.
    pub async fn insert_recorded(&self, sale: &Sale) -> DbResult<()> {
        validate_sale(sale)?;

        debug!(id = %sale.id, items = sale.items.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, tenant_id, sold_at, customer_name, customer_cpf,
                total_cents, payment_method, session_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.tenant_id)
        .bind(sale.date)
        .bind(&sale.customer_name)
        .bind(&sale.customer_cpf)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.session_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &sale.id),
            other => other,
        })?;

        for (line_no, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, line_no, product_id,
                    name_snapshot, unit_price_cents, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(line_no as i64)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a sale and puts its items back into stock.
    ///
    /// ## What This Does
    /// 1. Loads the sale's items
    /// 2. Adds each quantity back to its tracked product
    /// 3. Deletes the sale (items cascade)
    ///
    /// All writes happen in one transaction. Returns `NotFound` when the
    /// sale does not exist.
    pub async fn delete_sale(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_id, product_id, name_snapshot, unit_price_cents, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            restore_stock(&mut tx, &item.product_id, item.quantity).await?;
        }

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls back the stock updates
            return Err(DbError::not_found("Sale", id));
        }

        tx.commit().await?;

        info!(id = %id, items = items.len(), "Deleted sale");
        Ok(())
    }
}

/// Adds `quantity` back to the stock of a tracked product. Untracked or
/// unknown products are left alone.
async fn restore_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = current_stock + ?2,
            updated_at = ?3
        WHERE id = ?1 AND track_inventory = 1 AND current_stock IS NOT NULL
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() > 0 {
        debug!(product_id = %product_id, quantity, "Restored stock");
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
