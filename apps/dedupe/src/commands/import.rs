//! `dedupe import`
//!
//! Loads an upstream feed export into the store.
//!
//! ## Feed Shapes
//! ```text
//! [ {sale}, {sale}, ... ]                          sales only
//! { "products": [ {product}, ... ],                catalogue + sales
//!   "sales":    [ {sale}, ... ] }
//! ```
//!
//! Products go in first so that a later purge has stock to give back.
//! Sales are recorded as they happened upstream and do not move stock.
//! Each record stands alone: a record that fails to parse or is rejected by
//! the database is reported and skipped, the rest still go in.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use saleguard_core::{Product, Sale};
use saleguard_db::Database;

use crate::config::Settings;

/// A catalogue entry as the upstream export writes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: String,
    tenant_id: Option<String>,
    sku: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price_cents: i64,
    /// Defaults to whether a stock level was sent.
    track_inventory: Option<bool>,
    current_stock: Option<i64>,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl ProductRecord {
    fn into_product(self, default_tenant: &str) -> Product {
        let now = Utc::now();
        Product {
            id: self.id,
            tenant_id: self
                .tenant_id
                .unwrap_or_else(|| default_tenant.to_string()),
            sku: self.sku,
            name: self.name,
            price_cents: self.price_cents,
            track_inventory: self
                .track_inventory
                .unwrap_or(self.current_stock.is_some()),
            current_stock: self.current_stock,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which section of the feed a skipped record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Product,
    Sale,
}

/// A feed record that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub kind: RecordKind,
    /// Position in its feed array, zero-based.
    pub index: usize,
    pub record_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub products_imported: usize,
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Imports every valid record of `path`. Records without a `tenantId` are
/// assigned the configured tenant.
pub async fn import(
    db: &Database,
    settings: &Settings,
    path: &Path,
    out: &mut dyn Write,
) -> Result<ImportSummary> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let feed: Value = serde_json::from_str(&raw).context("Feed is not valid JSON")?;
    let (products, sales) = split_feed(feed)?;

    let mut summary = ImportSummary::default();

    let product_repo = db.products();
    for (index, record) in products.into_iter().enumerate() {
        let record_id = record_id(&record);

        let outcome = match serde_json::from_value::<ProductRecord>(record) {
            Ok(record) => {
                let product = record.into_product(&settings.tenant_id);
                product_repo.insert(&product).await.map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => summary.products_imported += 1,
            Err(reason) => summary.skip(RecordKind::Product, index, record_id, reason),
        }
    }

    let sale_repo = db.sales();
    for (index, record) in sales.into_iter().enumerate() {
        let record_id = record_id(&record);
        let has_tenant = record.get("tenantId").is_some();

        let outcome = match serde_json::from_value::<Sale>(record) {
            Ok(mut sale) => {
                if !has_tenant {
                    sale.tenant_id = settings.tenant_id.clone();
                }
                sale_repo
                    .insert_recorded(&sale)
                    .await
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => summary.imported += 1,
            Err(reason) => summary.skip(RecordKind::Sale, index, record_id, reason),
        }
    }

    info!(
        products = summary.products_imported,
        imported = summary.imported,
        skipped = summary.skipped.len(),
        "Import finished"
    );

    if summary.products_imported > 0 {
        writeln!(out, "{} produtos importados.", summary.products_imported)?;
    }
    writeln!(out, "{} vendas importadas.", summary.imported)?;
    for skipped in &summary.skipped {
        let kind = match skipped.kind {
            RecordKind::Product => "produto",
            RecordKind::Sale => "registro",
        };
        writeln!(
            out,
            "  {} {} ({}) ignorado: {}",
            kind,
            skipped.index,
            skipped.record_id.as_deref().unwrap_or("sem id"),
            skipped.reason
        )?;
    }

    Ok(summary)
}

impl ImportSummary {
    fn skip(&mut self, kind: RecordKind, index: usize, record_id: Option<String>, reason: String) {
        warn!(?kind, index, record_id = ?record_id, %reason, "Skipping feed record");
        self.skipped.push(SkippedRecord {
            kind,
            index,
            record_id,
            reason,
        });
    }
}

/// Splits a feed into its product and sale records.
fn split_feed(feed: Value) -> Result<(Vec<Value>, Vec<Value>)> {
    match feed {
        Value::Array(sales) => Ok((Vec::new(), sales)),
        Value::Object(mut map) => {
            let mut section = |key: &str| match map.remove(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(records)) => Ok(records),
                Some(_) => Err(anyhow!("Feed field '{key}' must be an array")),
            };
            let products = section("products")?;
            let sales = section("sales")?;
            Ok((products, sales))
        }
        _ => bail!("Feed must be a JSON array of sales or an object with products and sales"),
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get("id").and_then(Value::as_str).map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use saleguard_core::DEFAULT_TENANT_ID;
    use saleguard_db::DbConfig;

    const FEED: &str = r#"[
        {
            "id": "v1",
            "date": "2026-03-10T14:00:00Z",
            "customerName": "Maria Silva",
            "customerCpf": "12345678900",
            "totalCents": 2500,
            "paymentMethod": "pix",
            "items": [{ "productId": "p1", "quantity": 1, "unitPriceCents": 2500 }]
        },
        {
            "id": "v2",
            "date": "not a date",
            "customerName": "Maria Silva",
            "totalCents": 2500,
            "items": [{ "productId": "p1", "quantity": 1 }]
        },
        {
            "id": "v3",
            "date": "2026-03-10T14:00:30Z",
            "customerName": "Maria Silva",
            "totalCents": 2500,
            "items": []
        },
        {
            "id": "v1",
            "date": "2026-03-10T14:00:40Z",
            "customerName": "Maria Silva",
            "totalCents": 2500,
            "items": [{ "id": "p1", "quantity": 1 }]
        },
        {
            "id": "v4",
            "tenantId": "outra-loja",
            "date": "2026-03-10T14:01:00Z",
            "totalCents": 100,
            "items": [{ "productId": "p9", "quantity": 2 }]
        }
    ]"#;

    #[tokio::test]
    async fn test_import_skips_bad_records() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, FEED).unwrap();

        let mut out = Vec::new();
        let summary = import(&db, &Settings::default(), &path, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.imported, 2);
        let skipped: Vec<usize> = summary.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 2, 3]);
        assert_eq!(summary.skipped[0].record_id.as_deref(), Some("v2"));
        assert_eq!(summary.skipped[0].kind, RecordKind::Sale);
        assert_eq!(summary.products_imported, 0);

        let sales = db.sales().list_by_tenant(DEFAULT_TENANT_ID).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].customer_cpf.as_deref(), Some("12345678900"));
        assert_eq!(db.sales().count_by_tenant("outra-loja").await.unwrap(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2 vendas importadas.\n"));
        assert!(text.contains("registro 1 (v2) ignorado"));
    }

    #[tokio::test]
    async fn test_import_rejects_non_array_feed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, r#""v1""#).unwrap();

        let mut out = Vec::new();
        let err = import(&db, &Settings::default(), &path, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    const EXPORT: &str = r#"{
        "products": [
            { "id": "arroz", "sku": "ARROZ-5KG", "name": "Arroz 5kg", "priceCents": 2500, "currentStock": 8 },
            { "id": "sacola", "sku": "SACOLA", "trackInventory": false },
            { "id": "", "sku": "VAZIO" },
            { "sku": "SEM-ID" }
        ],
        "sales": [
            {
                "id": "v1",
                "date": "2026-03-10T14:00:00Z",
                "customerName": "Maria Silva",
                "totalCents": 5000,
                "items": [{ "productId": "arroz", "quantity": 2, "unitPriceCents": 2500 }]
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_import_export_with_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, EXPORT).unwrap();

        let mut out = Vec::new();
        let summary = import(&db, &Settings::default(), &path, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.products_imported, 2);
        assert_eq!(summary.imported, 1);
        let skipped: Vec<(RecordKind, usize)> =
            summary.skipped.iter().map(|s| (s.kind, s.index)).collect();
        assert_eq!(skipped, vec![(RecordKind::Product, 2), (RecordKind::Product, 3)]);

        // recorded sales leave stock as the export reported it
        let arroz = db.products().get_by_id("arroz").await.unwrap().unwrap();
        assert_eq!(arroz.tenant_id, DEFAULT_TENANT_ID);
        assert!(arroz.track_inventory);
        assert_eq!(arroz.current_stock, Some(8));

        let sacola = db.products().get_by_id("sacola").await.unwrap().unwrap();
        assert!(!sacola.track_inventory);
        assert_eq!(sacola.current_stock, None);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2 produtos importados.\n1 vendas importadas.\n"));
        assert!(text.contains("produto 3 (sem id) ignorado"));
    }

    #[test]
    fn test_split_feed_shapes() {
        let (products, sales) = split_feed(serde_json::json!([{ "id": "v1" }])).unwrap();
        assert!(products.is_empty());
        assert_eq!(sales.len(), 1);

        let (products, sales) =
            split_feed(serde_json::json!({ "products": [{ "id": "p1" }] })).unwrap();
        assert_eq!(products.len(), 1);
        assert!(sales.is_empty());

        assert!(split_feed(serde_json::json!({ "sales": { "id": "v1" } })).is_err());
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut out = Vec::new();

        let result = import(
            &db,
            &Settings::default(),
            Path::new("/nonexistent/feed.json"),
            &mut out,
        )
        .await;
        assert!(result.is_err());
    }
}
