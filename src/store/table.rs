//! Table store contract and MongoDB implementation
//!
//! Rows are addressed by a two-part key: a partition identifier (`pk`) and a
//! row identifier (`rk`, unique within the partition). Row bodies are generic
//! property bags (BSON documents); the typed-record boundary is the
//! [`TableRow`] trait, which owns serialization in both directions.

use async_trait::async_trait;
use bson::Document;
use futures_util::StreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use tracing::debug;

use crate::db::schemas::{self, IntoIndexes};
use crate::db::MongoClient;
use crate::store::filter::Filter;
use crate::types::{Result, RosterError};

/// Partition key field on every stored row
pub const FIELD_PK: &str = "pk";
/// Row key field on every stored row
pub const FIELD_RK: &str = "rk";

/// A typed record that maps to one table row
pub trait TableRow: Sized + Send + Sync {
    /// Table (collection) the record lives in
    const TABLE: &'static str;

    fn partition_key(&self) -> String;
    fn row_key(&self) -> String;

    /// Serialize the record's fields into a property bag. Key fields are
    /// added by the store, not here.
    fn into_document(&self) -> Document;

    /// Decode a property bag back into a typed record. Field-level failures
    /// (missing field, type mismatch, unparseable date) surface as
    /// `RosterError::Store` naming the field, never a panic.
    fn from_document(doc: &Document) -> Result<Self>;
}

/// Store adapter contract: single-row writes and filtered reads
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create a row; `Conflict` if the key already exists
    async fn put(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()>;

    /// Fetch a row; `NotFound` if absent
    async fn get(&self, table: &str, pk: &str, rk: &str) -> Result<Document>;

    /// Filtered scan. The result is fully materialized: all result pages
    /// are fetched before returning.
    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Replace a row in full; `NotFound` if absent
    async fn replace(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()>;

    /// Delete a row; `NotFound` if absent
    async fn delete(&self, table: &str, pk: &str, rk: &str) -> Result<()>;
}

/// Create a typed record
pub async fn put_row<T: TableRow>(store: &dyn TableStore, row: &T) -> Result<()> {
    store
        .put(
            T::TABLE,
            &row.partition_key(),
            &row.row_key(),
            row.into_document(),
        )
        .await
}

/// Fetch and decode a typed record
pub async fn get_row<T: TableRow>(store: &dyn TableStore, pk: &str, rk: &str) -> Result<T> {
    let doc = store.get(T::TABLE, pk, rk).await?;
    T::from_document(&doc)
}

/// Query and decode typed records
pub async fn query_rows<T: TableRow>(store: &dyn TableStore, filter: &Filter) -> Result<Vec<T>> {
    let docs = store.query(T::TABLE, filter).await?;
    docs.iter().map(T::from_document).collect()
}

/// Replace a typed record in full
pub async fn replace_row<T: TableRow>(store: &dyn TableStore, row: &T) -> Result<()> {
    store
        .replace(
            T::TABLE,
            &row.partition_key(),
            &row.row_key(),
            row.into_document(),
        )
        .await
}

/// Delete the row backing a typed record
pub async fn delete_row<T: TableRow>(store: &dyn TableStore, pk: &str, rk: &str) -> Result<()> {
    store.delete(T::TABLE, pk, rk).await
}

/// MongoDB-backed table store
///
/// One handle is constructed at startup and shared by every component; there
/// is no process-wide table-client registry.
#[derive(Clone)]
pub struct MongoTableStore {
    db: Database,
}

impl MongoTableStore {
    /// Create the store and apply per-table indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let store = Self {
            db: mongo.database(),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    fn coll(&self, table: &str) -> Collection<Document> {
        self.db.collection::<Document>(table)
    }

    /// Apply the unique key index plus schema-declared indexes
    async fn ensure_indexes(&self) -> Result<()> {
        for table in schemas::ALL_TABLES {
            let key_index = IndexModel::builder()
                .keys(bson::doc! { FIELD_PK: 1, FIELD_RK: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("key_unique".to_string())
                        .build(),
                )
                .build();
            self.coll(table)
                .create_index(key_index)
                .await
                .map_err(|e| {
                    RosterError::Store(format!("Failed to create key index on {}: {}", table, e))
                })?;
        }

        self.apply_schema_indexes::<schemas::Availability>().await?;
        self.apply_schema_indexes::<schemas::Duty>().await?;
        self.apply_schema_indexes::<schemas::Event>().await?;
        Ok(())
    }

    async fn apply_schema_indexes<T: TableRow + IntoIndexes>(&self) -> Result<()> {
        let schema_indices = T::into_indices();
        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.coll(T::TABLE)
            .create_indexes(indices)
            .await
            .map_err(|e| {
                RosterError::Store(format!("Failed to create indexes on {}: {}", T::TABLE, e))
            })?;
        Ok(())
    }
}

/// Whether a MongoDB error is a duplicate-key write failure
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

#[async_trait]
impl TableStore for MongoTableStore {
    async fn put(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()> {
        let mut row = fields;
        row.insert(FIELD_PK, pk);
        row.insert(FIELD_RK, rk);

        self.coll(table).insert_one(row).await.map_err(|e| {
            if is_duplicate_key(&e) {
                RosterError::Conflict(format!("{}: row ({}, {}) already exists", table, pk, rk))
            } else {
                RosterError::Store(format!("Insert into {} failed: {}", table, e))
            }
        })?;

        debug!("put {}/{}/{}", table, pk, rk);
        Ok(())
    }

    async fn get(&self, table: &str, pk: &str, rk: &str) -> Result<Document> {
        self.coll(table)
            .find_one(bson::doc! { FIELD_PK: pk, FIELD_RK: rk })
            .await
            .map_err(|e| RosterError::Store(format!("Find in {} failed: {}", table, e)))?
            .ok_or_else(|| {
                RosterError::NotFound(format!("{}: row ({}, {})", table, pk, rk))
            })
    }

    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Document>> {
        let bson_filter = filter.to_document()?;

        let mut cursor = self
            .coll(table)
            .find(bson_filter)
            .await
            .map_err(|e| RosterError::Store(format!("Query on {} failed: {}", table, e)))?;

        // Drain every result page before returning; callers assume a
        // fully-materialized sequence.
        let mut results = Vec::new();
        while let Some(item) = cursor.next().await {
            let doc = item
                .map_err(|e| RosterError::Store(format!("Scan of {} failed: {}", table, e)))?;
            results.push(doc);
        }
        Ok(results)
    }

    async fn replace(&self, table: &str, pk: &str, rk: &str, fields: Document) -> Result<()> {
        let mut row = fields;
        row.insert(FIELD_PK, pk);
        row.insert(FIELD_RK, rk);

        let result = self
            .coll(table)
            .replace_one(bson::doc! { FIELD_PK: pk, FIELD_RK: rk }, row)
            .await
            .map_err(|e| RosterError::Store(format!("Replace in {} failed: {}", table, e)))?;

        if result.matched_count == 0 {
            return Err(RosterError::NotFound(format!(
                "{}: row ({}, {})",
                table, pk, rk
            )));
        }
        Ok(())
    }

    async fn delete(&self, table: &str, pk: &str, rk: &str) -> Result<()> {
        let result = self
            .coll(table)
            .delete_one(bson::doc! { FIELD_PK: pk, FIELD_RK: rk })
            .await
            .map_err(|e| RosterError::Store(format!("Delete from {} failed: {}", table, e)))?;

        if result.deleted_count == 0 {
            return Err(RosterError::NotFound(format!(
                "{}: row ({}, {})",
                table, pk, rk
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // The TableStore contract is exercised against MemoryTableStore in
    // store::memory; MongoTableStore integration tests require a live
    // MongoDB instance.
}
