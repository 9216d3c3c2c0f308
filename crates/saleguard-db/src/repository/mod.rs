//! # Repository Module
//!
//! Database repository implementations for SaleGuard.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  dedupe command                                                        │
//! │       │                                                                 │
//! │       │  db.sales().list_by_tenant(tenant_id)                          │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── insert(&self, sale)          sale + items, stock out              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_tenant(&self, tenant)                                     │
//! │  └── delete_sale(&self, id)       stock back, sale + items gone        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs (`FromRow`) stay private to each repository and convert into
//! the saleguard-core types.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products with tracked stock
//! - [`SaleRepository`](sale::SaleRepository) - Sales and sale items

pub mod product;
pub mod sale;
