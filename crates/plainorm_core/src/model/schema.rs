//! Entity schema declarations and the `Entity` trait.

use crate::error::AccessError;
use rusqlite::types::Value;

/// One declared struct field and its persistence markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Rust field name, used by the accessors.
    pub name: &'static str,
    /// Column override; `None` means the column is named like the field.
    pub column: Option<&'static str>,
    /// Marks the primary key / generated key.
    pub identifier: bool,
    /// Excludes the field from persistence.
    pub transient: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            identifier: false,
            transient: false,
        }
    }

    /// `#[id]` marker.
    pub const fn id(self) -> Self {
        Self {
            identifier: true,
            ..self
        }
    }

    /// `#[transient]` marker.
    pub const fn transient(self) -> Self {
        Self {
            transient: true,
            ..self
        }
    }

    /// `#[column = "..."]` marker.
    pub const fn column(self, column: &'static str) -> Self {
        Self {
            column: Some(column),
            ..self
        }
    }

    pub fn column_name(&self) -> &'static str {
        self.column.unwrap_or(self.name)
    }
}

/// Static description of an entity type, in field declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

/// A plain data type persisted to one table.
///
/// Usually implemented through [`entity!`](crate::entity). `Default` supplies
/// the blank instance that result rows are written into.
pub trait Entity: Default + 'static {
    fn schema() -> &'static EntitySchema;

    /// Reads a field by its Rust name as a database value.
    fn read_field(&self, field: &str) -> Result<Value, AccessError>;

    /// Writes a database value into a field by its Rust name.
    fn write_field(&mut self, field: &str, value: Value) -> Result<(), AccessError>;
}
