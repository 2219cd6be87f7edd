//! Entity manager: the public find / find_all / save / delete surface.
//!
//! # Responsibility
//! - Define the use-case contract over managed entity types.
//! - Compose metadata, SQL generation, named statements and mapping into one
//!   connection-scoped statement lifecycle per call.
//!
//! # Invariants
//! - Only types validated at construction are operated on.
//! - Each call acquires exactly one connection and releases it before
//!   returning, on success and on error.
//! - The manager holds no mutable state after construction.

mod basic;
mod registry;

pub use basic::{BasicEntityManager, EntityManagerBuilder};
pub use registry::EntityRegistry;

use crate::error::OrmResult;
use crate::logging::sanitize_message;
use crate::mapping::accessor::FieldValue;
use crate::model::schema::Entity;
use log::error;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// Result of deleting one entity by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { rows: usize },
    NotFound,
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Persistence operations over managed entity types.
pub trait EntityManager {
    /// Loads the entity with identifier `id`; `Ok(None)` when no row matches.
    fn find<E: Entity>(&self, id: impl FieldValue) -> OrmResult<Option<E>>;

    /// Loads every row of `E`'s table in result order.
    fn find_all<E: Entity>(&self) -> OrmResult<Vec<E>>;

    /// Inserts `entity` and writes the generated identifier back into it.
    fn save<'e, E: Entity>(&self, entity: &'e mut E) -> OrmResult<&'e mut E>;

    /// Deletes the row carrying `entity`'s identifier.
    ///
    /// A missing row is `DeleteOutcome::NotFound`; driver failures stay errors.
    fn delete<E: Entity>(&self, entity: &E) -> OrmResult<DeleteOutcome>;

    /// Boolean form of `delete`: any error is logged and reported as `false`,
    /// so "row missing" and "database failure" are indistinguishable.
    fn delete_quietly<E: Entity>(&self, entity: &E) -> bool {
        match self.delete(entity) {
            Ok(outcome) => outcome.is_deleted(),
            Err(err) => {
                error!(
                    "event=entity_delete module=orm status=error error_code={} entity={} swallowed=true error={}",
                    err.code(),
                    std::any::type_name::<E>(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                false
            }
        }
    }
}
