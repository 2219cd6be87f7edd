//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections carry the `foreign_keys` and busy-timeout settings
//!   from `DbConfig`.

use super::DbResult;
use crate::config::DbConfig;
use crate::logging::sanitize_message;
use log::{debug, error};
use rusqlite::Connection;
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// Opens a connection described by `config` and applies its pragmas.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_connection(config: &DbConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = config.mode();
    debug!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.path {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            );
            return Err(err.into());
        }
    };

    match configure_connection(&conn, config) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            );
            Err(err.into())
        }
    }
}

fn configure_connection(conn: &Connection, config: &DbConfig) -> rusqlite::Result<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(config.busy_timeout())?;
    Ok(())
}
