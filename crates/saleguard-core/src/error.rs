//! # Error Types
//!
//! Domain-specific error types for saleguard-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  saleguard-core errors (this file)                                     │
//! │  ├── CoreError        - Sale rejected by business rules                │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  saleguard-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  dedupe CLI                                                            │
//! │  └── anyhow::Error    - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → anyhow → terminal       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The detector and the report formatter have no error conditions of their
//! own. Malformed timestamps never reach them: they are rejected when a
//! `Sale` is deserialized or decoded from a row.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Why a sale was refused.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale cannot be accepted as-is.
    ///
    /// ## When This Occurs
    /// - Importing a sale with no line items
    /// - A sale carries more lines than `MAX_SALE_ITEMS`
    #[error("Invalid sale {sale_id}: {reason}")]
    InvalidSale { sale_id: String, reason: String },

    /// A single field failed its check.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidSale error.
    pub fn invalid_sale(sale_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidSale {
            sale_id: sale_id.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level failures, named after the offending field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative where only positive counts make sense.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
