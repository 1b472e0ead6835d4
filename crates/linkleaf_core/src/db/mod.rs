//! SQLite storage for LinkLeaf records.
//!
//! # Responsibility
//! - Hand out connections whose schema is migrated to `migrations::latest_version()`.
//! - Own the table mapping that repositories and migrations agree on.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; no side table is used.
//! - A database stamped by a newer build is refused, never downgraded.
//!
//! # See also
//! - `schema::PERSON_TABLE` for the person table mapping.
//! - `crate::repo::person_repo` for the data mapper built on these connections.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a LinkLeaf database.
#[derive(Debug)]
pub enum DbError {
    /// Driver-level failure (I/O, locking, SQL).
    Sqlite(rusqlite::Error),
    /// The file was migrated by a build that knows more versions than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "linkleaf schema version {db_version} is not supported by this build (max {latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
