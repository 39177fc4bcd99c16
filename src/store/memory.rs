//! In-memory table store
//!
//! Backs unit tests and dev mode. Behaves like the MongoDB implementation at
//! the contract level: key-field injection, `Conflict` on duplicate create,
//! `NotFound` on missing keys, filter evaluation over property bags.

use async_trait::async_trait;
use bson::Document;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::store::filter::Filter;
use crate::store::table::{TableStore, FIELD_PK, FIELD_RK};
use crate::types::{Result, RosterError};

type Table = BTreeMap<(String, String), Document>;

/// In-memory `TableStore` implementation
#[derive(Default)]
pub struct MemoryTableStore {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table (test helper)
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(|t| t.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn put(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()> {
        let mut row = fields;
        row.insert(FIELD_PK, pk);
        row.insert(FIELD_RK, rk);

        let mut tables = self.tables.write().await;
        let entries = tables.entry(table.to_string()).or_default();
        let key = (pk.to_string(), rk.to_string());
        if entries.contains_key(&key) {
            return Err(RosterError::Conflict(format!(
                "{}: row ({}, {}) already exists",
                table, pk, rk
            )));
        }
        entries.insert(key, row);
        Ok(())
    }

    async fn get(&self, table: &str, pk: &str, rk: &str) -> Result<Document> {
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|t| t.get(&(pk.to_string(), rk.to_string())))
            .cloned()
            .ok_or_else(|| RosterError::NotFound(format!("{}: row ({}, {})", table, pk, rk)))
    }

    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Document>> {
        filter.validate()?;

        let tables = self.tables.read().await;
        let Some(entries) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    async fn replace(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()> {
        let mut row = fields;
        row.insert(FIELD_PK, pk);
        row.insert(FIELD_RK, rk);

        let mut tables = self.tables.write().await;
        let entries = tables.entry(table.to_string()).or_default();
        let key = (pk.to_string(), rk.to_string());
        if !entries.contains_key(&key) {
            return Err(RosterError::NotFound(format!(
                "{}: row ({}, {})",
                table, pk, rk
            )));
        }
        entries.insert(key, row);
        Ok(())
    }

    async fn delete(&self, table: &str, pk: &str, rk: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(table)
            .and_then(|t| t.remove(&(pk.to_string(), rk.to_string())));
        if removed.is_none() {
            return Err(RosterError::NotFound(format!(
                "{}: row ({}, {})",
                table, pk, rk
            )));
        }
        Ok(())
    }
}
