//! SQLite connection bootstrap and the connection-provider seam.
//!
//! # Responsibility
//! - Open and configure SQLite connections from `DbConfig`.
//! - Hand connections to the entity manager as scoped guards.
//!
//! # Invariants
//! - Returned connections have the configured pragmas applied.
//! - A provider guard releases its connection on every exit path.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod provider;

pub use open::open_connection;
pub use provider::{ConnectionProvider, FileConnectionProvider, ScopedConnection, SharedConnection};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidConfig(message) => write!(f, "invalid database config: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
