//! Core of plainorm: a minimal object-relational mapper over SQLite.
//!
//! Entity types declare their table, identifier and persisted fields through
//! [`entity!`]; [`BasicEntityManager`] validates them once and then runs
//! find / find_all / save / delete with generated, fully parameterized SQL.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod manager;
pub mod mapping;
pub mod model;
pub mod sql;

pub use config::DbConfig;
pub use db::{
    open_connection, ConnectionProvider, DbError, DbResult, FileConnectionProvider,
    SharedConnection,
};
pub use error::{
    AccessError, BindError, ConfigurationError, ConversionError, MappingError, OrmError,
    OrmResult,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use manager::{
    BasicEntityManager, DeleteOutcome, EntityManager, EntityManagerBuilder, EntityRegistry,
};
pub use mapping::accessor::FieldValue;
pub use mapping::metadata::{EntityMetadata, FieldDescriptor};
pub use mapping::params::ParamMap;
pub use model::schema::{Entity, EntitySchema, FieldDef};
pub use rusqlite::types::Value;
pub use sql::named_statement::NamedStatement;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
