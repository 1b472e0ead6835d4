//! Person domain model.
//!
//! # Responsibility
//! - Define the record persisted in the person table.
//! - Expose accessors for `id` and `name`.
//!
//! # Invariants
//! - `id` is assigned by storage on insert and never by application code.
//! - Once present, `id` does not change for the lifetime of the record.
//! - `name` carries no constraints: it may be absent, empty or duplicated.
//!
//! # See also
//! - `crate::db::schema::PERSON_TABLE`

use serde::{Deserialize, Serialize};

/// Surrogate key generated by the storage backend.
pub type PersonId = i64;

/// One row of the person table.
///
/// A person without an `id` is transient; it becomes persisted once the
/// repository inserts it and writes the storage-assigned key back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: Option<PersonId>,
    name: Option<String>,
}

impl Person {
    /// Creates a transient person with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Rebuilds a persisted person from an existing storage key.
    ///
    /// Used by the storage mapping and by import paths where the row
    /// already exists. Callers must not invent keys with this.
    pub fn with_id(id: PersonId, name: Option<String>) -> Self {
        Self { id: Some(id), name }
    }

    /// Storage-assigned key, `None` until persisted.
    pub fn id(&self) -> Option<PersonId> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Returns whether storage has assigned a key to this person.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn assign_id(&mut self, id: PersonId) {
        self.id = Some(id);
    }
}
