//! # saleguard-core: Pure Business Logic for SaleGuard
//!
//! Finds sales that were recorded more than once (a double tap on
//! "confirm sale", a retried request) and turns the findings into a
//! plain-text report an operator can act on.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SaleGuard Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    dedupe CLI (apps/dedupe)                     │   │
//! │  │        scan ──► select groups ──► purge ──► re-scan             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ saleguard-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ duplicates │  │  report   │  │ validation│  │   │
//! │  │   │   Sale    │  │  Detector  │  │ Formatter │  │   rules   │  │   │
//! │  │   │  Money    │  │  Groups    │  │  (.txt)   │  │  checks   │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 saleguard-db (Database Layer)                   │   │
//! │  │         load tenant sales, delete sale + restore stock          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, SaleItem, Product, PaymentMethod)
//! - [`money`] - Money type with integer arithmetic
//! - [`duplicates`] - The duplicate sale detector
//! - [`report`] - Plain-text report of a detection run
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use saleguard_core::duplicates::detect_duplicates;
//! use saleguard_core::report::format_duplicate_report;
//!
//! let result = detect_duplicates(&[]);
//! assert_eq!(result.total_sales, 0);
//! assert!(result.duplicate_groups.is_empty());
//!
//! let text = format_duplicate_report(&result);
//! assert!(text.contains("Total de vendas analisadas: 0"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod duplicates;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use duplicates::{
    calculate_confidence, compare_sale_items, detect_duplicates, Confidence, DetectionConfig,
    DuplicateDetectionResult, DuplicateDetector, DuplicateGroup, GroupSelection, MatchCriteria,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{format_duplicate_report, ReportFormatter};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID used when no tenant is configured.
///
/// The schema is multi-tenant; detection always runs over exactly one
/// tenant's sales.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum line items accepted on a single sale.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
pub const MAX_ITEM_QUANTITY: i64 = 999;
