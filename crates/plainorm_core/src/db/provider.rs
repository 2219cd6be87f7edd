//! Connection providers consumed by the entity manager.
//!
//! # Responsibility
//! - Supply one ready connection per manager operation.
//! - Release that connection when the returned guard is dropped.
//!
//! # Invariants
//! - Providers never retry, pool, or hold connections across calls.
//! - Guards deref to a configured `rusqlite::Connection`.

use super::{open_connection, DbError, DbResult};
use crate::config::DbConfig;
use log::debug;
use rusqlite::Connection;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Source of database connections for manager operations.
///
/// The guard returned by `acquire` is the connection's scope: dropping it
/// closes or returns the connection.
pub trait ConnectionProvider {
    type Guard<'a>: Deref<Target = Connection>
    where
        Self: 'a;

    fn acquire(&self) -> DbResult<Self::Guard<'_>>;
}

/// Opens a fresh file-backed connection for every operation.
#[derive(Debug, Clone)]
pub struct FileConnectionProvider {
    config: DbConfig,
}

impl FileConnectionProvider {
    /// Creates a provider for a file database.
    ///
    /// # Errors
    /// - `DbError::InvalidConfig` when `config.path` is `None`, since every
    ///   fresh in-memory connection would see an empty database.
    pub fn new(config: DbConfig) -> DbResult<Self> {
        if config.path.is_none() {
            return Err(DbError::InvalidConfig(
                "file connection provider requires a database path".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

impl ConnectionProvider for FileConnectionProvider {
    type Guard<'a> = ScopedConnection;

    fn acquire(&self) -> DbResult<ScopedConnection> {
        open_connection(&self.config).map(ScopedConnection::new)
    }
}

/// Owned connection that is closed when dropped.
pub struct ScopedConnection {
    conn: Connection,
    acquired_at: Instant,
}

impl ScopedConnection {
    fn new(conn: Connection) -> Self {
        Self {
            conn,
            acquired_at: Instant::now(),
        }
    }
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        debug!(
            "event=connection_release module=db status=ok held_ms={}",
            self.acquired_at.elapsed().as_millis()
        );
    }
}

/// One connection shared by all operations, serialized through a mutex.
///
/// This is the provider for in-memory databases, whose contents live only as
/// long as their single connection.
pub struct SharedConnection {
    conn: Mutex<Connection>,
}

impl SharedConnection {
    pub fn open(config: &DbConfig) -> DbResult<Self> {
        open_connection(config).map(Self::from_connection)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&DbConfig::in_memory())
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl ConnectionProvider for SharedConnection {
    type Guard<'a> = MutexGuard<'a, Connection>;

    fn acquire(&self) -> DbResult<MutexGuard<'_, Connection>> {
        // Poisoning only records a panic in another holder; the connection stays usable.
        Ok(self.conn.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
