//! # Duplicate Cleanup
//!
//! Deletes a batch of sale ids one at a time.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Deletion Batch                                     │
//! │                                                                         │
//! │  ids = result.select(..).duplicate_ids()                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for id in ids ──► deleter.delete_sale(id).await                       │
//! │       │                 │                                               │
//! │       │                 ├── Ok  → deleted.push(id)                      │
//! │       │                 └── Err → warn!, failed.push(id), continue     │
//! │       ▼                                                                 │
//! │  CleanupReport { requested, deleted, failed }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each deletion is awaited before the next starts. There are no retries and
//! a failure never aborts the batch.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DbResult;
use crate::repository::sale::SaleRepository;

/// Anything that can delete a sale by id.
#[async_trait]
pub trait SaleDeleter: Send + Sync {
    async fn delete_sale(&self, id: &str) -> DbResult<()>;
}

#[async_trait]
impl SaleDeleter for SaleRepository {
    async fn delete_sale(&self, id: &str) -> DbResult<()> {
        SaleRepository::delete_sale(self, id).await
    }
}

/// A deletion that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDeletion {
    pub sale_id: String,
    pub reason: String,
}

/// Outcome of a deletion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Number of ids handed to the batch.
    pub requested: usize,
    /// Ids deleted, in request order.
    pub deleted: Vec<String>,
    /// Ids that failed, in request order.
    pub failed: Vec<FailedDeletion>,
}

impl CleanupReport {
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes every id in order, continuing past failures.
pub async fn delete_duplicates<D>(deleter: &D, ids: &[String]) -> CleanupReport
where
    D: SaleDeleter + ?Sized,
{
    let mut report = CleanupReport {
        requested: ids.len(),
        ..CleanupReport::default()
    };

    for id in ids {
        match deleter.delete_sale(id).await {
            Ok(()) => report.deleted.push(id.clone()),
            Err(e) => {
                warn!(sale_id = %id, error = %e, "Failed to delete duplicate sale");
                report.failed.push(FailedDeletion {
                    sale_id: id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        requested = report.requested,
        deleted = report.success_count(),
        failed = report.failed.len(),
        "Duplicate cleanup finished"
    );

    report
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use saleguard_core::{PaymentMethod, Sale, SaleItem, DEFAULT_TENANT_ID};
    use std::sync::Mutex;

    /// Records call order and fails on chosen ids.
    struct FakeDeleter {
        fail_on: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeDeleter {
        fn failing_on(fail_on: Vec<&'static str>) -> Self {
            FakeDeleter {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SaleDeleter for FakeDeleter {
        async fn delete_sale(&self, id: &str) -> DbResult<()> {
            self.calls.lock().unwrap().push(id.to_string());
            if self.fail_on.iter().any(|f| *f == id) {
                return Err(DbError::QueryFailed("disk I/O error".to_string()));
            }
            Ok(())
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_deletes_in_order_and_continues_past_failures() {
        let deleter = FakeDeleter::failing_on(vec!["b"]);

        let report = delete_duplicates(&deleter, &ids(&["a", "b", "c"])).await;

        assert_eq!(*deleter.calls.lock().unwrap(), ids(&["a", "b", "c"]));
        assert_eq!(report.requested, 3);
        assert_eq!(report.deleted, ids(&["a", "c"]));
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].sale_id, "b");
        assert!(report.failed[0].reason.contains("disk I/O error"));
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let deleter = FakeDeleter::failing_on(vec![]);

        let report = delete_duplicates(&deleter, &[]).await;

        assert_eq!(report, CleanupReport::default());
        assert!(report.is_complete());
        assert!(deleter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_deletion_fails() {
        let deleter = FakeDeleter::failing_on(vec!["a", "b"]);

        let report = delete_duplicates(&deleter, &ids(&["a", "b"])).await;

        assert_eq!(report.success_count(), 0);
        assert_eq!(report.failed.len(), 2);
    }

    #[tokio::test]
    async fn test_sale_repository_as_deleter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sales();

        let sale = Sale {
            id: "dup-1".to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            date: Utc::now(),
            customer_name: "Maria".to_string(),
            customer_cpf: None,
            total_cents: 1000,
            payment_method: PaymentMethod::Cash,
            session_id: None,
            items: vec![SaleItem {
                product_id: "p1".to_string(),
                name_snapshot: "Café".to_string(),
                unit_price_cents: 1000,
                quantity: 1,
            }],
        };
        repo.insert_recorded(&sale).await.unwrap();

        // the repeated id is already gone by the time it comes up again
        let report = delete_duplicates(&repo, &ids(&["dup-1", "dup-1"])).await;

        assert_eq!(report.deleted, ids(&["dup-1"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(repo.count_by_tenant(DEFAULT_TENANT_ID).await.unwrap(), 0);
    }
}
