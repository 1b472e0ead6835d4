//! Repository layer: persistence mapping for domain models.
//!
//! # Responsibility
//! - Define data access contracts per model.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repositories only accept connections whose schema matches
//!   `crate::db::schema`.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod person_repo;
