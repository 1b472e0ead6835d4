//! Domain records persisted by LinkLeaf core.
//!
//! # Responsibility
//! - Define plain data structures mapped to storage tables.
//!
//! # Invariants
//! - Models hold no storage logic; mapping lives in `crate::db::schema` and
//!   `crate::repo`.

pub mod person;
