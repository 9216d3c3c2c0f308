//! `dedupe purge`
//!
//! Deletes the duplicates of the selected groups one at a time, prints the
//! tally, then reloads and scans again so the operator sees what is left.
//! Originals are never deleted.

use std::io::Write;

use anyhow::Result;
use tracing::info;

use saleguard_db::{delete_duplicates, CleanupReport, Database};

use crate::cli::PurgeArgs;
use crate::config::Settings;

use super::{detect, print_summary};

/// Returns `None` for a dry run or when nothing was selected.
pub async fn purge(
    db: &Database,
    settings: &Settings,
    args: &PurgeArgs,
    out: &mut dyn Write,
) -> Result<Option<CleanupReport>> {
    let result = detect(db, settings).await?;
    let ids = result.select(&args.selection());

    if ids.is_empty() {
        writeln!(out, "Nenhuma duplicata selecionada.")?;
        return Ok(None);
    }

    if !args.yes {
        writeln!(out, "Seriam excluídas {} vendas duplicadas:", ids.len())?;
        for id in &ids {
            writeln!(out, "  - {id}")?;
        }
        writeln!(out, "Execute novamente com --yes para confirmar.")?;
        return Ok(None);
    }

    info!(count = ids.len(), "Deleting selected duplicates");
    let report = delete_duplicates(&db.sales(), &ids).await;

    writeln!(
        out,
        "{} de {} vendas duplicadas excluídas.",
        report.success_count(),
        report.requested
    )?;
    for failure in &report.failed {
        writeln!(out, "  falha ao excluir {}: {}", failure.sale_id, failure.reason)?;
    }

    writeln!(out)?;
    let after = detect(db, settings).await?;
    print_summary(out, &after)?;

    Ok(Some(report))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::import;
    use crate::commands::test_support::sale;
    use saleguard_core::{Confidence, DEFAULT_TENANT_ID};
    use saleguard_db::DbConfig;

    /// Group 1 is high confidence, group 2 medium (no close-time bonus).
    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for s in [
            sale("a1", 0, "Maria", 2500),
            sale("a2", 10, "Maria", 2500),
            sale("a3", 20, "Maria", 2500),
            sale("b1", 3600, "João", 990),
            sale("b2", 3690, "João", 990),
        ] {
            db.sales().insert_recorded(&s).await.unwrap();
        }
        db
    }

    async fn remaining(db: &Database) -> Vec<String> {
        db.sales()
            .list_by_tenant(DEFAULT_TENANT_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect()
    }

    #[tokio::test]
    async fn test_dry_run_deletes_nothing() {
        let db = seeded_db().await;
        let args = PurgeArgs {
            all: true,
            ..PurgeArgs::default()
        };

        let mut out = Vec::new();
        let report = purge(&db, &Settings::default(), &args, &mut out).await.unwrap();

        assert!(report.is_none());
        assert_eq!(remaining(&db).await.len(), 5);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Seriam excluídas 3 vendas duplicadas:"));
        assert!(text.contains("  - a2\n  - a3\n  - b2\n"));
    }

    #[tokio::test]
    async fn test_purge_selected_group_and_rescan() {
        let db = seeded_db().await;
        let args = PurgeArgs {
            group: vec![1],
            yes: true,
            ..PurgeArgs::default()
        };

        let mut out = Vec::new();
        let report = purge(&db, &Settings::default(), &args, &mut out)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.deleted, vec!["a2".to_string(), "a3".to_string()]);
        assert!(report.is_complete());
        assert_eq!(remaining(&db).await, vec!["a1", "b1", "b2"]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2 de 2 vendas duplicadas excluídas."));
        // the rescan still sees the untouched second group
        assert!(text.contains("Vendas analisadas: 3"));
        assert!(text.contains("1. [medium] b1"));
    }

    #[tokio::test]
    async fn test_purge_by_min_confidence() {
        let db = seeded_db().await;
        let args = PurgeArgs {
            min_confidence: Some(Confidence::High),
            yes: true,
            ..PurgeArgs::default()
        };

        let mut out = Vec::new();
        purge(&db, &Settings::default(), &args, &mut out).await.unwrap();

        assert_eq!(remaining(&db).await, vec!["a1", "b1", "b2"]);
    }

    #[tokio::test]
    async fn test_out_of_range_group_selects_nothing() {
        let db = seeded_db().await;
        let args = PurgeArgs {
            group: vec![9],
            yes: true,
            ..PurgeArgs::default()
        };

        let mut out = Vec::new();
        let report = purge(&db, &Settings::default(), &args, &mut out).await.unwrap();

        assert!(report.is_none());
        assert_eq!(remaining(&db).await.len(), 5);
    }

    #[tokio::test]
    async fn test_import_then_purge_restores_stock() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("export.json");
        std::fs::write(
            &feed,
            r#"{
                "products": [
                    { "id": "arroz", "sku": "ARROZ-5KG", "priceCents": 2500, "currentStock": 7 },
                    { "id": "sacola", "sku": "SACOLA", "trackInventory": false }
                ],
                "sales": [
                    { "id": "v1", "date": "2026-03-10T14:00:00Z", "customerName": "Maria",
                      "totalCents": 5000,
                      "items": [{ "productId": "arroz", "quantity": 2 }, { "productId": "sacola", "quantity": 1 }] },
                    { "id": "v2", "date": "2026-03-10T14:00:15Z", "customerName": "Maria",
                      "totalCents": 5000,
                      "items": [{ "productId": "sacola", "quantity": 1 }, { "productId": "arroz", "quantity": 2 }] }
                ]
            }"#,
        )
        .unwrap();

        let settings = Settings {
            database_path: dir.path().join("loja.db"),
            ..Settings::default()
        };
        let db = Database::new(settings.db_config()).await.unwrap();

        let mut out = Vec::new();
        let summary = import(&db, &settings, &feed, &mut out).await.unwrap();
        assert_eq!((summary.products_imported, summary.imported), (2, 2));

        let stock = |id: &'static str| {
            let db = db.clone();
            async move { db.products().get_by_id(id).await.unwrap().unwrap().current_stock }
        };
        assert_eq!(stock("arroz").await, Some(7));

        let args = PurgeArgs {
            all: true,
            yes: true,
            ..PurgeArgs::default()
        };
        let report = purge(&db, &settings, &args, &mut out).await.unwrap().unwrap();

        assert_eq!(report.deleted, vec!["v2".to_string()]);
        assert_eq!(remaining(&db).await, vec!["v1"]);
        assert_eq!(stock("arroz").await, Some(9));
        assert_eq!(stock("sacola").await, None);
        db.close().await;
    }
}
