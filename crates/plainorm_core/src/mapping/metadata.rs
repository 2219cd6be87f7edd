//! Metadata reader: validates a declared schema into `EntityMetadata`.
//!
//! # Responsibility
//! - Resolve table name, identifier field and persistable fields of a type.
//! - Reject schemas that break the registration rules.
//!
//! # Invariants
//! - Exactly one identifier field per validated type.
//! - Persistable fields keep declaration order; INSERT column and value lists
//!   are both derived from that order.
//! - Table and column names are plain SQL identifiers, so they can be spliced
//!   into generated SQL text and used as placeholder names.

use crate::error::ConfigurationError;
use crate::model::schema::{Entity, EntitySchema, FieldDef};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SQL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid sql identifier regex"));

/// A mapped field: Rust field name plus the column it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column: &'static str,
}

impl From<&FieldDef> for FieldDescriptor {
    fn from(value: &FieldDef) -> Self {
        Self {
            name: value.name,
            column: value.column_name(),
        }
    }
}

/// Validated, immutable view of one managed entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub type_name: &'static str,
    pub table: &'static str,
    pub identifier: FieldDescriptor,
    pub persistable: Vec<FieldDescriptor>,
}

impl EntityMetadata {
    /// Validates `E`'s declared schema.
    pub fn of<E: Entity>() -> Result<Self, ConfigurationError> {
        inspect_schema(std::any::type_name::<E>(), E::schema())
    }

    /// Identifier first, then persistable fields: every column a row must carry.
    pub fn mapped_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        std::iter::once(&self.identifier).chain(self.persistable.iter())
    }
}

/// Returns the table configured for `E`.
pub fn table_for<E: Entity>() -> Result<&'static str, ConfigurationError> {
    schema_table(std::any::type_name::<E>(), E::schema())
}

/// Returns the single identifier field of `E`.
pub fn identifier_field<E: Entity>() -> Result<FieldDescriptor, ConfigurationError> {
    schema_identifier(std::any::type_name::<E>(), E::schema())
}

/// Returns `E`'s fields that are neither identifier nor transient, in
/// declaration order.
pub fn persistable_fields<E: Entity>() -> Vec<FieldDescriptor> {
    schema_persistable(E::schema())
}

pub(crate) fn inspect_schema(
    entity: &'static str,
    schema: &EntitySchema,
) -> Result<EntityMetadata, ConfigurationError> {
    let table = schema_table(entity, schema)?;
    let identifier = schema_identifier(entity, schema)?;
    let persistable = schema_persistable(schema);

    let mut seen = HashSet::new();
    for field in std::iter::once(&identifier).chain(persistable.iter()) {
        ensure_sql_identifier(entity, field.column)?;
        if !seen.insert(field.column) {
            return Err(ConfigurationError::DuplicateColumn {
                entity,
                column: field.column,
            });
        }
    }

    Ok(EntityMetadata {
        type_name: entity,
        table,
        identifier,
        persistable,
    })
}

fn schema_table(
    entity: &'static str,
    schema: &EntitySchema,
) -> Result<&'static str, ConfigurationError> {
    if schema.table.trim().is_empty() {
        return Err(ConfigurationError::MissingEntityMarker { entity });
    }
    ensure_sql_identifier(entity, schema.table)?;
    Ok(schema.table)
}

fn schema_identifier(
    entity: &'static str,
    schema: &EntitySchema,
) -> Result<FieldDescriptor, ConfigurationError> {
    let mut identifiers = schema.fields.iter().filter(|field| field.identifier);
    let first = identifiers.next();
    let extra = identifiers.count();

    match first {
        Some(field) if extra == 0 => {
            if field.transient {
                return Err(ConfigurationError::TransientIdentifier {
                    entity,
                    field: field.name,
                });
            }
            Ok(FieldDescriptor::from(field))
        }
        Some(_) => Err(ConfigurationError::IdentifierCount {
            entity,
            count: extra + 1,
        }),
        None => Err(ConfigurationError::IdentifierCount { entity, count: 0 }),
    }
}

fn schema_persistable(schema: &EntitySchema) -> Vec<FieldDescriptor> {
    schema
        .fields
        .iter()
        .filter(|field| !field.identifier && !field.transient)
        .map(FieldDescriptor::from)
        .collect()
}

fn ensure_sql_identifier(
    entity: &'static str,
    name: &'static str,
) -> Result<(), ConfigurationError> {
    if SQL_IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidName { entity, name })
    }
}
