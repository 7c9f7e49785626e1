//! Connection management.
//!
//! Each store owns one database file with a single serialized writer.
//! Stores never share a connection; cross-store transactions are not
//! supported.

pub mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use drift_core::errors::StoreError;
use rusqlite::Connection;

use self::pragmas::apply_pragmas;

/// Map a rusqlite error into the store taxonomy.
pub fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::Sqlite {
        message: e.to_string(),
    }
}

/// A single-writer database handle.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) a database file, apply pragmas, run the given
    /// migration set.
    pub fn open(
        path: &Path,
        migrate: fn(&Connection) -> Result<(), StoreError>,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            // A file that exists but cannot be opened as sqlite is corrupt,
            // not merely busy.
            if path.exists() {
                StoreError::Corrupt {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            } else {
                sqlite_err(e)
            }
        })?;
        apply_pragmas(&conn)?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory(
        migrate: fn(&Connection) -> Result<(), StoreError>,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        apply_pragmas(&conn)?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Run a closure against the serialized connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let guard = self.conn.lock().map_err(|_| StoreError::Sqlite {
            message: "connection lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Run a closure inside a transaction; commits on Ok, rolls back on Err.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StoreError>,
    {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Sqlite {
            message: "connection lock poisoned".to_string(),
        })?;
        let tx = guard.transaction().map_err(sqlite_err)?;
        let out = f(&tx)?;
        tx.commit().map_err(sqlite_err)?;
        Ok(out)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
