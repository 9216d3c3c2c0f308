//! `dedupe scan`

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use saleguard_core::{DuplicateDetectionResult, DuplicateDetector};
use saleguard_db::Database;

use crate::cli::ScanArgs;
use crate::config::Settings;

use super::print_summary;

/// Loads the tenant's sales and runs the detector over them.
pub async fn detect(db: &Database, settings: &Settings) -> Result<DuplicateDetectionResult> {
    let sales = db
        .sales()
        .list_by_tenant(&settings.tenant_id)
        .await
        .context("Failed to load sales")?;

    let config = settings.detection_config()?;
    let result = DuplicateDetector::new(config).detect(&sales);

    info!(
        sales = result.total_sales,
        groups = result.duplicate_groups.len(),
        duplicates = result.total_duplicates,
        "Detection finished"
    );

    Ok(result)
}

pub async fn scan(
    db: &Database,
    settings: &Settings,
    args: &ScanArgs,
    out: &mut dyn Write,
) -> Result<DuplicateDetectionResult> {
    let result = detect(db, settings).await?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        print_summary(out, &result)?;
    }

    if let Some(path) = &args.report {
        let report = settings.report_formatter().format(&result);
        std::fs::write(path, report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        info!(path = %path.display(), "Report saved");
        if !args.json {
            writeln!(out, "Relatório salvo em {}", path.display())?;
        }
    }

    Ok(result)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::sale;
    use saleguard_db::DbConfig;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for s in [
            sale("s1", 0, "Maria Silva", 2500),
            sale("s2", 30, "Maria Silva", 2500),
            sale("s3", 7200, "Maria Silva", 2500),
        ] {
            db.sales().insert_recorded(&s).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_scan_prints_summary_and_writes_report() {
        let db = seeded_db().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duplicatas.txt");
        let args = ScanArgs {
            report: Some(path.clone()),
            json: false,
        };

        let mut out = Vec::new();
        let result = scan(&db, &Settings::default(), &args, &mut out).await.unwrap();

        assert_eq!(result.total_sales, 3);
        assert_eq!(result.duplicate_ids(), vec!["s2".to_string()]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Grupos de duplicatas: 1"));
        assert!(text.contains("Relatório salvo em"));

        let report = std::fs::read_to_string(&path).unwrap();
        assert!(report.starts_with("RELATÓRIO DE VENDAS DUPLICADAS\n"));
        // Brasília offset applied to the 14:00 UTC anchor
        assert!(report.contains("  Data: 10/03/2026 11:00:00"));
    }

    #[tokio::test]
    async fn test_scan_json_output_is_parseable() {
        let db = seeded_db().await;
        let args = ScanArgs {
            report: None,
            json: true,
        };

        let mut out = Vec::new();
        scan(&db, &Settings::default(), &args, &mut out).await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["totalSales"], 3);
        assert_eq!(value["totalDuplicates"], 1);
        assert_eq!(value["duplicateGroups"][0]["confidence"], "high");
    }

    #[tokio::test]
    async fn test_scan_uses_configured_window() {
        let db = seeded_db().await;
        let mut settings = Settings::default();
        settings.detection.window_secs = 10;

        let result = detect(&db, &settings).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_scan_other_tenant_is_empty() {
        let db = seeded_db().await;
        let mut settings = Settings::default();
        settings.tenant_id = "outra-loja".to_string();

        let mut out = Vec::new();
        let result = scan(&db, &settings, &ScanArgs::default(), &mut out)
            .await
            .unwrap();
        assert_eq!(result.total_sales, 0);
    }
}
