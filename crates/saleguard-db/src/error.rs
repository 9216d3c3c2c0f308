//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error / MigrateError / CoreError                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError  ◄── constraint messages classified here                      │
//! │       │                                                                 │
//! │       ├──► cleanup: recorded as a FailedDeletion, batch continues      │
//! │       ├──► import:  record skipped with the message                    │
//! │       └──► anyhow in the dedupe CLI, printed on stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use saleguard_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup or delete of an id that is not stored, e.g. a duplicate that
    /// was already removed by an earlier purge.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Re-importing a sale id, or a repeated SKU within a tenant.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The file could not be opened or created, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be read back, such as an unparsable
    /// `sold_at` or an unknown payment method.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Business rules rejected the record before it reached SQLite.
    #[error("Rejected: {0}")]
    Validation(#[from] CoreError),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// ```text
/// RowNotFound          → NotFound
/// Database (UNIQUE)    → UniqueViolation { field: "<table>.<column>" }
/// Database (FOREIGN)   → ForeignKeyViolation
/// Database (other)     → QueryFailed
/// ColumnDecode/Decode  → Decode
/// PoolTimedOut         → PoolExhausted
/// PoolClosed           → ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite: "UNIQUE constraint failed: sales.id"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(field, "unknown")
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Decode(format!("column {index}: {source}"))
            }

            sqlx::Error::Decode(source) => DbError::Decode(source.to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
