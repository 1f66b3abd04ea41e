//! Database layer for NeuroKeep.

mod schema;
mod patients;
mod medications;
mod events;
mod bp_logs;
mod demo_requests;
mod store;

pub use schema::*;
pub use store::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        tracing::info!(path = %path.as_ref().display(), "opening database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        tracing::debug!("schema initialized");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one transaction. Commits on `Ok`; an `Err` drops the
    /// transaction and rolls back every write `f` made.
    pub fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(DbError::from(e)))?;
        let out = f(self)?;
        tx.commit().map_err(|e| E::from(DbError::from(e)))?;
        Ok(out)
    }

    /// Run `f` inside one read transaction so every query it issues sees the
    /// same committed state.
    pub fn read_snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.in_transaction(f)
    }
}

/// Wrap a column decoding failure as a rusqlite conversion error.
pub(crate) fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
