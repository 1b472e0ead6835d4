//! Core persistence for LinkLeaf.
//! Defines the `Person` record and its SQLite mapping.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::person::{Person, PersonId};
pub use repo::person_repo::{
    PersonListQuery, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
