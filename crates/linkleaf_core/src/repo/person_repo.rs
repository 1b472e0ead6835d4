//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Map `Person` records onto the person table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Keys are assigned by SQLite on insert and written back to the record.
//! - A record that already carries a key is never inserted again.
//! - Read paths reject impossible persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::schema::{TableSchema, PERSON_TABLE};
use crate::db::DbError;
use crate::model::person::{Person, PersonId};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(PersonId),
    /// Insert was attempted for a record that already has a storage key.
    AlreadyPersisted(PersonId),
    /// Update was attempted for a record that was never inserted.
    MissingIdentity,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Column exists but its declared type or key role differs from the mapping.
    ColumnMismatch {
        table: &'static str,
        column: &'static str,
        expected: String,
        found: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::AlreadyPersisted(id) => write!(f, "person already persisted with id {id}"),
            Self::MissingIdentity => write!(f, "person has no id; insert it first"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::ColumnMismatch {
                table,
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{table}.{column}` is declared as `{found}`, expected `{expected}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options for listing persons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for the person lifecycle.
pub trait PersonRepository {
    /// Inserts a transient person and writes the assigned key back into it.
    fn create_person(&self, person: &mut Person) -> RepoResult<PersonId>;
    /// Overwrites `name` of an existing row.
    fn update_person(&self, person: &Person) -> RepoResult<()>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists persons ordered by ascending key.
    fn list_persons(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    /// Removes the row permanently.
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
    fn count_persons(&self) -> RepoResult<u64>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
    sql: PersonStatements,
}

/// SQL text rendered once from a table mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonStatements {
    table: &'static str,
    key: &'static str,
    select: String,
    insert: String,
    update: String,
    delete: String,
    count: String,
}

impl PersonStatements {
    /// Expects the identity key plus exactly one writable column.
    fn for_table(table: &TableSchema) -> RepoResult<Self> {
        let key = table
            .identity_column()
            .ok_or_else(|| {
                RepoError::InvalidData(format!("mapping `{}` has no identity key", table.name))
            })?
            .name;
        let value = match table.columns {
            [first, second] if first.name == key => second.name,
            [first, second] if second.name == key => first.name,
            _ => {
                return Err(RepoError::InvalidData(format!(
                    "mapping `{}` must have one key and one value column",
                    table.name
                )))
            }
        };
        let name = table.name;

        Ok(Self {
            table: name,
            key,
            select: format!("SELECT {key}, {value} FROM {name}"),
            insert: format!("INSERT INTO {name} ({value}) VALUES (?1);"),
            update: format!("UPDATE {name} SET {value} = ?1 WHERE {key} = ?2;"),
            delete: format!("DELETE FROM {name} WHERE {key} = ?1;"),
            count: format!("SELECT COUNT(*) FROM {name};"),
        })
    }
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`, `MissingRequiredColumn` or `ColumnMismatch`
    ///   when the table does not match `PERSON_TABLE`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &PERSON_TABLE)?;
        Ok(Self {
            conn,
            sql: PersonStatements::for_table(&PERSON_TABLE)?,
        })
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<Person> {
        let id = row.get::<_, Option<PersonId>>(0)?.ok_or_else(|| {
            RepoError::InvalidData(format!("NULL value in {}.{}", self.sql.table, self.sql.key))
        })?;
        Ok(Person::with_id(id, row.get(1)?))
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &mut Person) -> RepoResult<PersonId> {
        if let Some(id) = person.id() {
            return Err(RepoError::AlreadyPersisted(id));
        }

        self.conn.execute(&self.sql.insert, params![person.name()])?;
        let id = self.conn.last_insert_rowid();
        person.assign_id(id);

        debug!("event=person_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        let id = person.id().ok_or(RepoError::MissingIdentity)?;

        let changed = self
            .conn
            .execute(&self.sql.update, params![person.name(), id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=person_update module=repo status=ok id={id}");
        Ok(())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE {} = ?1;", self.sql.select, self.sql.key))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_row(row)?));
        }

        Ok(None)
    }

    fn list_persons(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{} ORDER BY {} ASC", self.sql.select, self.sql.key);
        let mut bind_values: Vec<Value> = Vec::new();

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(self.parse_row(row)?);
        }

        Ok(persons)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let changed = self.conn.execute(&self.sql.delete, [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=person_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn count_persons(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(&self.sql.count, [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn ensure_connection_ready(conn: &Connection, table: &TableSchema) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table.name)? {
        return Err(RepoError::MissingRequiredTable(table.name));
    }

    let present = table_columns(conn, table.name)?;
    for expected in table.columns {
        let Some(found) = present.iter().find(|column| column.name == expected.name) else {
            return Err(RepoError::MissingRequiredColumn {
                table: table.name,
                column: expected.name,
            });
        };

        // A non-INTEGER key is not a rowid alias and would store NULL ids.
        let type_matches = found.sql_type.eq_ignore_ascii_case(expected.sql_type);
        if !type_matches || found.primary_key != expected.primary_key {
            return Err(RepoError::ColumnMismatch {
                table: table.name,
                column: expected.name,
                expected: describe_column(expected.sql_type, expected.primary_key),
                found: describe_column(&found.sql_type, found.primary_key),
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

struct ColumnInfo {
    name: String,
    sql_type: String,
    primary_key: bool,
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get("name")?,
                sql_type: row.get("type")?,
                primary_key: row.get::<_, i64>("pk")? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn describe_column(sql_type: &str, primary_key: bool) -> String {
    if primary_key {
        format!("{sql_type} PRIMARY KEY")
    } else {
        sql_type.to_string()
    }
}
