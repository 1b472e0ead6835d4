//! Explicit table mapping for persisted models.
//!
//! # Responsibility
//! - Describe table names, columns, SQL types and key generation.
//! - Render the DDL that migrations must agree with.
//!
//! # Invariants
//! - Every table has exactly one identity primary key column.
//! - Column order matches the migration DDL.

/// Key-generation policy for a primary key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// Storage assigns increasing values on insert and never reuses them.
    Identity,
}

/// Mapping for one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    /// SQLite declared type as reported by `PRAGMA table_info`.
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    pub generation: Option<GenerationStrategy>,
}

/// Mapping for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnSchema],
}

/// Storage mapping for `Person`.
pub const PERSON_TABLE: TableSchema = TableSchema {
    name: "table_1",
    columns: &[
        ColumnSchema {
            name: "id",
            sql_type: "INTEGER",
            nullable: false,
            primary_key: true,
            generation: Some(GenerationStrategy::Identity),
        },
        ColumnSchema {
            name: "name",
            sql_type: "TEXT",
            nullable: true,
            primary_key: false,
            generation: None,
        },
    ],
};

impl TableSchema {
    /// The storage-generated primary key column, if declared.
    pub fn identity_column(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| {
            column.primary_key && column.generation == Some(GenerationStrategy::Identity)
        })
    }

    /// Renders a `CREATE TABLE` statement for this mapping.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(render_column)
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!("CREATE TABLE {} (\n    {}\n);", self.name, columns)
    }
}

fn render_column(column: &ColumnSchema) -> String {
    let mut sql = format!("{} {}", column.name, column.sql_type);
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
        if column.generation == Some(GenerationStrategy::Identity) {
            // AUTOINCREMENT keeps ids of deleted rows from being handed out again.
            sql.push_str(" AUTOINCREMENT");
        }
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}
