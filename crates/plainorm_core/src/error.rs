//! Error taxonomy for registration, mapping, binding and execution.
//!
//! # Responsibility
//! - Give every failure class of the mapping layer its own semantic variant.
//! - Keep driver errors reachable through `Error::source` instead of
//!   flattening them into strings.
//!
//! # Invariants
//! - `ConfigurationError` only occurs while building a manager.
//! - `UnmanagedType` is raised before any connection is acquired.

use crate::db::DbError;
use rusqlite::types::Type;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrmResult<T> = Result<T, OrmError>;

/// Registration-time rejection of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The type declares no table, so it carries no usable entity marker.
    MissingEntityMarker { entity: &'static str },
    /// Zero or more than one field is marked `#[id]`.
    IdentifierCount { entity: &'static str, count: usize },
    /// The identifier field is also marked `#[transient]`.
    TransientIdentifier {
        entity: &'static str,
        field: &'static str,
    },
    /// Table or column name is not a plain SQL identifier.
    InvalidName {
        entity: &'static str,
        name: &'static str,
    },
    /// Two mapped fields resolve to the same column.
    DuplicateColumn {
        entity: &'static str,
        column: &'static str,
    },
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEntityMarker { entity } => {
                write!(f, "type `{entity}` is not declared as an entity (no table)")
            }
            Self::IdentifierCount { entity, count } => write!(
                f,
                "entity `{entity}` must declare exactly one identifier field, found {count}"
            ),
            Self::TransientIdentifier { entity, field } => write!(
                f,
                "identifier field `{field}` of entity `{entity}` cannot be transient"
            ),
            Self::InvalidName { entity, name } => write!(
                f,
                "entity `{entity}` uses `{name}` which is not a plain SQL identifier"
            ),
            Self::DuplicateColumn { entity, column } => write!(
                f,
                "entity `{entity}` maps more than one field to column `{column}`"
            ),
        }
    }
}

impl Error for ConfigurationError {}

/// Failure converting between a native field type and a database value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    UnexpectedType { expected: &'static str, found: Type },
    OutOfRange { target: &'static str, value: i64 },
    Invalid { target: &'static str, message: String },
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedType { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
            Self::OutOfRange { target, value } => {
                write!(f, "value {value} does not fit into {target}")
            }
            Self::Invalid { target, message } => write!(f, "invalid {target} value: {message}"),
        }
    }
}

impl Error for ConversionError {}

/// Failure reading or writing a field on an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// The entity has no readable/writable field with that name.
    UnknownField { entity: &'static str, field: String },
    /// The value cannot be stored in the field's native type.
    Incompatible {
        entity: &'static str,
        field: &'static str,
        source: ConversionError,
    },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { entity, field } => {
                write!(f, "entity `{entity}` has no accessible field `{field}`")
            }
            Self::Incompatible {
                entity,
                field,
                source,
            } => write!(f, "cannot assign `{entity}.{field}`: {source}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownField { .. } => None,
            Self::Incompatible { source, .. } => Some(source),
        }
    }
}

/// Failure binding named parameters onto a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The parameter map has no entry for a placeholder in the SQL text.
    MissingParameter { name: String },
    /// A value was bound to a name that does not occur in the SQL text.
    UnknownParameter { name: String },
    /// The statement was executed before every placeholder had a value.
    Unbound { name: String },
    /// The SQL text carries a placeholder that cannot be bound by name
    /// (`?`, `?NNN`, `@name`, `$name`).
    Positional { marker: String },
}

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter { name } => {
                write!(f, "no value supplied for placeholder `:{name}`")
            }
            Self::UnknownParameter { name } => {
                write!(f, "statement has no placeholder named `:{name}`")
            }
            Self::Unbound { name } => write!(f, "placeholder `:{name}` was never bound"),
            Self::Positional { marker } => {
                write!(f, "placeholder `{marker}` cannot be bound by name")
            }
        }
    }
}

impl Error for BindError {}

/// Failure turning a result row into an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    Access(AccessError),
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { table, column } => {
                write!(f, "result row from `{table}` has no column `{column}`")
            }
            Self::Access(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingColumn { .. } => None,
            Self::Access(err) => Some(err),
        }
    }
}

impl From<AccessError> for MappingError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

/// Umbrella error returned by entity manager operations.
#[derive(Debug)]
pub enum OrmError {
    Configuration(ConfigurationError),
    UnmanagedType { type_name: &'static str },
    Db(DbError),
    Bind(BindError),
    Mapping(MappingError),
    Access(AccessError),
    MissingGeneratedKey { table: &'static str },
}

impl Display for OrmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "{err}"),
            Self::UnmanagedType { type_name } => {
                write!(f, "type `{type_name}` is not managed by this entity manager")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Bind(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "{err}"),
            Self::Access(err) => write!(f, "{err}"),
            Self::MissingGeneratedKey { table } => {
                write!(f, "insert into `{table}` did not produce a generated key")
            }
        }
    }
}

impl Error for OrmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Bind(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::Access(err) => Some(err),
            Self::UnmanagedType { .. } | Self::MissingGeneratedKey { .. } => None,
        }
    }
}

impl OrmError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::UnmanagedType { .. } => "unmanaged_type",
            Self::Db(_) => "db",
            Self::Bind(_) => "bind",
            Self::Mapping(_) => "mapping",
            Self::Access(_) => "access",
            Self::MissingGeneratedKey { .. } => "missing_generated_key",
        }
    }
}

impl From<ConfigurationError> for OrmError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

impl From<DbError> for OrmError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for OrmError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<BindError> for OrmError {
    fn from(value: BindError) -> Self {
        Self::Bind(value)
    }
}

impl From<MappingError> for OrmError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

impl From<AccessError> for OrmError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}
