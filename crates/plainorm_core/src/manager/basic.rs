//! Connection-provider-backed entity manager.

use super::registry::EntityRegistry;
use super::{DeleteOutcome, EntityManager, MAX_LOGGED_ERROR_CHARS};
use crate::db::ConnectionProvider;
use crate::error::{ConfigurationError, OrmError, OrmResult};
use crate::logging::sanitize_message;
use crate::mapping::accessor::{self, FieldValue};
use crate::mapping::helper;
use crate::mapping::metadata::EntityMetadata;
use crate::mapping::params::ParamMap;
use crate::model::schema::Entity;
use crate::sql::generator;
use crate::sql::named_statement::NamedStatement;
use log::{debug, error, info};
use rusqlite::types::Value;
use std::any::TypeId;
use std::sync::Arc;
use std::time::Instant;

type Inspect = fn() -> Result<EntityMetadata, ConfigurationError>;

/// Collects candidate entity types; `build` validates all of them.
pub struct EntityManagerBuilder<P> {
    provider: P,
    candidates: Vec<(TypeId, Inspect)>,
}

impl<P: ConnectionProvider> EntityManagerBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            candidates: Vec::new(),
        }
    }

    /// Adds `E` to the managed set. Registering a type twice is harmless.
    pub fn register<E: Entity>(mut self) -> Self {
        self.candidates
            .push((TypeId::of::<E>(), EntityMetadata::of::<E>));
        self
    }

    /// Validates every candidate and produces a ready manager.
    ///
    /// # Errors
    /// - The first `ConfigurationError` found; no manager is produced.
    pub fn build(self) -> Result<BasicEntityManager<P>, ConfigurationError> {
        let started_at = Instant::now();
        let mut registry = EntityRegistry::default();

        for (type_id, inspect) in self.candidates {
            match registry.insert(type_id, inspect) {
                Ok(metadata) => debug!(
                    "event=entity_register module=orm status=ok entity={} table={} columns={}",
                    metadata.type_name,
                    metadata.table,
                    metadata.persistable.len() + 1
                ),
                Err(err) => {
                    error!(
                        "event=manager_build module=orm status=error error_code=configuration error={}",
                        err
                    );
                    return Err(err);
                }
            }
        }

        info!(
            "event=manager_build module=orm status=ok entities={} duration_ms={}",
            registry.len(),
            started_at.elapsed().as_millis()
        );

        Ok(BasicEntityManager {
            provider: self.provider,
            registry: Arc::new(registry),
        })
    }
}

/// Entity manager running one statement per call on a provided connection.
#[derive(Clone)]
pub struct BasicEntityManager<P> {
    provider: P,
    registry: Arc<EntityRegistry>,
}

impl<P: ConnectionProvider> BasicEntityManager<P> {
    pub fn builder(provider: P) -> EntityManagerBuilder<P> {
        EntityManagerBuilder::new(provider)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    fn query(&self, sql: &str, params: &ParamMap) -> OrmResult<Vec<ParamMap>> {
        let conn = self.provider.acquire()?;
        let mut statement = NamedStatement::prepare(&conn, sql)?;
        statement.set_parameters(params)?;
        let rows = statement.execute_query()?;
        Ok(rows)
    }

    fn insert_row<E: Entity>(&self, metadata: &EntityMetadata, entity: &E) -> OrmResult<i64> {
        let params = helper::instance_to_param_map(entity, metadata)?;
        let sql = generator::insert(metadata, &params);

        let conn = self.provider.acquire()?;
        let mut statement = NamedStatement::prepare_with_keys(&conn, &sql)?;
        statement.set_parameters(&params)?;
        statement.execute()?;
        let key = statement
            .generated_key()
            .ok_or(OrmError::MissingGeneratedKey {
                table: metadata.table,
            })?;
        Ok(key)
    }

    fn delete_row<E: Entity>(
        &self,
        metadata: &EntityMetadata,
        entity: &E,
    ) -> OrmResult<DeleteOutcome> {
        let mut params = ParamMap::with_capacity(1);
        params.insert(
            metadata.identifier.column,
            accessor::get(&metadata.identifier, entity)?,
        );

        let conn = self.provider.acquire()?;
        let mut statement = NamedStatement::prepare(&conn, &generator::delete_by_id(metadata))?;
        statement.set_parameters(&params)?;
        let rows = statement.execute_update()?;
        if rows > 0 {
            Ok(DeleteOutcome::Deleted { rows })
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}

impl<P: ConnectionProvider> EntityManager for BasicEntityManager<P> {
    fn find<E: Entity>(&self, id: impl FieldValue) -> OrmResult<Option<E>> {
        let metadata = self.registry.metadata::<E>()?;
        let started_at = Instant::now();

        let mut params = ParamMap::with_capacity(1);
        params.insert(metadata.identifier.column, id.to_value());
        let result = self
            .query(&generator::select_by_id(metadata), &params)
            .and_then(|rows| match rows.first() {
                Some(row) => Ok(Some(helper::row_to_instance(row, metadata)?)),
                None => Ok(None),
            });

        observe("entity_find", metadata.table, started_at, result)
    }

    fn find_all<E: Entity>(&self) -> OrmResult<Vec<E>> {
        let metadata = self.registry.metadata::<E>()?;
        let started_at = Instant::now();

        let result = self
            .query(&generator::select_all(metadata), &ParamMap::new())
            .and_then(|rows| helper::rows_to_instances(metadata, &rows).map_err(OrmError::from));

        observe("entity_find_all", metadata.table, started_at, result)
    }

    fn save<'e, E: Entity>(&self, entity: &'e mut E) -> OrmResult<&'e mut E> {
        let metadata = self.registry.metadata::<E>()?;
        let started_at = Instant::now();

        let result = self.insert_row(metadata, &*entity);
        let key = observe("entity_save", metadata.table, started_at, result)?;
        accessor::set(&metadata.identifier, entity, Value::Integer(key))?;
        Ok(entity)
    }

    fn delete<E: Entity>(&self, entity: &E) -> OrmResult<DeleteOutcome> {
        let metadata = self.registry.metadata::<E>()?;
        let started_at = Instant::now();

        let result = self.delete_row(metadata, entity);
        observe("entity_delete", metadata.table, started_at, result)
    }
}

fn observe<T>(
    event: &'static str,
    table: &str,
    started_at: Instant,
    result: OrmResult<T>,
) -> OrmResult<T> {
    match &result {
        Ok(_) => debug!(
            "event={} module=orm status=ok table={} duration_ms={}",
            event,
            table,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={} module=orm status=error table={} duration_ms={} error_code={} error={}",
            event,
            table,
            started_at.elapsed().as_millis(),
            err.code(),
            sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
        ),
    }
    result
}
