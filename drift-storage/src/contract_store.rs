//! The contract store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use drift_core::errors::StoreError;
use drift_core::types::contract::{
    BackendEndpoint, Contract, ContractStatus, FieldMismatch, FrontendCall,
};
use rusqlite::params;

use crate::connection::{sqlite_err, Database};
use crate::migrations;

pub struct ContractStore {
    db: Database,
    cache: RwLock<BTreeMap<String, Contract>>,
}

impl ContractStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::open(path, migrations::contracts::migrate)?;
        let store = Self {
            db,
            cache: RwLock::new(BTreeMap::new()),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory(migrations::contracts::migrate)?;
        let store = Self {
            db,
            cache: RwLock::new(BTreeMap::new()),
        };
        store.reload()?;
        Ok(store)
    }

    /// Replace the stored contract set in one transaction.
    pub fn save_all(&self, contracts: &[Contract]) -> Result<(), StoreError> {
        self.db.with_tx(|tx| {
            tx.execute("DELETE FROM contracts", []).map_err(sqlite_err)?;
            let mut stmt = tx
                .prepare(
                    "INSERT INTO contracts
                     (id, method, normalized_path, backend, frontend_calls,
                      mismatches, status, confidence)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(sqlite_err)?;
            for c in contracts {
                stmt.execute(params![
                    c.id,
                    c.method,
                    c.normalized_path,
                    to_json(&c.backend)?,
                    to_json(&c.frontend_calls)?,
                    to_json(&c.mismatches)?,
                    c.status.name(),
                    c.confidence,
                ])
                .map_err(sqlite_err)?;
            }
            Ok(())
        })?;
        self.reload()
    }

    pub fn get(&self, id: &str) -> Option<Contract> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn get_all(&self) -> Vec<Contract> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    fn reload(&self) -> Result<(), StoreError> {
        let loaded = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, method, normalized_path, backend, frontend_calls,
                            mismatches, status, confidence
                     FROM contracts ORDER BY id",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, f64>(7)?,
                    ))
                })
                .map_err(sqlite_err)?;

            let mut out = BTreeMap::new();
            for row in rows {
                let (id, method, normalized_path, backend, frontend_calls, mismatches, status, confidence) =
                    row.map_err(sqlite_err)?;
                let backend: BackendEndpoint = from_json(&backend)?;
                let frontend_calls: Vec<FrontendCall> = from_json(&frontend_calls)?;
                let mismatches: Vec<FieldMismatch> = from_json(&mismatches)?;
                out.insert(
                    id.clone(),
                    Contract {
                        id,
                        method,
                        normalized_path,
                        backend,
                        frontend_calls,
                        mismatches,
                        status: ContractStatus::parse(&status)
                            .unwrap_or(ContractStatus::Discovered),
                        confidence,
                    },
                );
            }
            Ok(out)
        })?;
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = loaded;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Sqlite {
        message: format!("json encode: {e}"),
    })
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Sqlite {
        message: format!("json decode: {e}"),
    })
}
