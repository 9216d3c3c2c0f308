//! # saleguard-db: Database Layer for SaleGuard
//!
//! SQLite storage for sales, their items and the products whose stock a
//! deleted sale gives back. Uses sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SaleGuard Data Flow                              │
//! │                                                                         │
//! │  dedupe CLI (scan / purge / import)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   saleguard-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Cleanup    │  │   │
//! │  │   │   (pool.rs)   │    │               │    │ (cleanup.rs) │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │◄───│ SaleDeleter  │  │   │
//! │  │   │ Migrations    │    │               │    │ one by one   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./saleguard.db (configurable)                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and sale repositories
//! - [`cleanup`] - Sequential deletion of duplicate sales
//!
//! ## Usage
//!
//! ```rust,ignore
//! use saleguard_db::{delete_duplicates, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./saleguard.db")).await?;
//! let sales = db.sales().list_by_tenant(tenant_id).await?;
//! let result = saleguard_core::detect_duplicates(&sales);
//!
//! let report = delete_duplicates(&db.sales(), &result.duplicate_ids()).await;
//! println!("{} deleted", report.success_count());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cleanup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use cleanup::{delete_duplicates, CleanupReport, FailedDeletion, SaleDeleter};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
