//! Duty catalog schema
//!
//! Immutable catalog entries grouped under a single partition; the duty
//! catalog for a role is an equality scan on `role_id`.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::schemas::{req_str, IntoIndexes};
use crate::store::TableRow;
use crate::types::Result;

/// Table name for the duty catalog
pub const DUTY_TABLE: &str = "duties";

/// Grouping partition for all catalog entries
pub const DUTY_PARTITION: &str = "duties";

/// A catalog duty attached to a role
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Duty {
    pub id: String,
    pub role_id: String,
    pub name: String,
    pub description: String,
}

impl Duty {
    /// New catalog entry with a generated id
    pub fn new(
        role_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role_id: role_id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl TableRow for Duty {
    const TABLE: &'static str = DUTY_TABLE;

    fn partition_key(&self) -> String {
        DUTY_PARTITION.to_string()
    }

    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn into_document(&self) -> Document {
        doc! {
            "id": &self.id,
            "role_id": &self.role_id,
            "name": &self.name,
            "description": &self.description,
        }
    }

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Self {
            id: req_str(doc, "id")?,
            role_id: req_str(doc, "role_id")?,
            name: req_str(doc, "name")?,
            description: req_str(doc, "description")?,
        })
    }
}

impl IntoIndexes for Duty {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "role_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("role_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RosterError;

    #[test]
    fn test_document_round_trip() {
        let duty = Duty::new("r1", "Open bar", "Stock and open the venue bar");
        let decoded = Duty::from_document(&duty.into_document()).unwrap();
        assert_eq!(decoded, duty);
    }

    #[test]
    fn test_shared_grouping_partition() {
        let a = Duty::new("r1", "a", "");
        let b = Duty::new("r2", "b", "");
        assert_eq!(a.partition_key(), b.partition_key());
        assert_ne!(a.row_key(), b.row_key());
    }

    #[test]
    fn test_missing_field_is_store_error() {
        let mut doc = Duty::new("r1", "a", "").into_document();
        doc.remove("role_id");
        let err = Duty::from_document(&doc).unwrap_err();
        assert!(matches!(err, RosterError::Store(_)));
        assert!(err.to_string().contains("role_id"));
    }
}
