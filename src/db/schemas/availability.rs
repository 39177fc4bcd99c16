//! Availability window schema
//!
//! One row per window an employee is available to work, partitioned by
//! employee id for efficient per-employee range scans.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::schemas::{encode_ts, req_date, req_str, IntoIndexes};
use crate::store::TableRow;
use crate::types::Result;

/// Table name for availability windows
pub const AVAILABILITY_TABLE: &str = "availabilities";

/// An availability window reported by an employee
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    pub id: String,
    pub employee_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Availability {
    /// New window with a generated id
    pub fn new(employee_id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            start,
            end,
        }
    }
}

impl TableRow for Availability {
    const TABLE: &'static str = AVAILABILITY_TABLE;

    fn partition_key(&self) -> String {
        self.employee_id.clone()
    }

    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn into_document(&self) -> Document {
        doc! {
            "id": &self.id,
            "employee_id": &self.employee_id,
            "start": encode_ts(&self.start),
            "end": encode_ts(&self.end),
        }
    }

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Self {
            id: req_str(doc, "id")?,
            employee_id: req_str(doc, "employee_id")?,
            start: req_date(doc, "start")?,
            end: req_date(doc, "end")?,
        })
    }
}

impl IntoIndexes for Availability {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "employee_id": 1, "start": 1 },
            Some(
                IndexOptions::builder()
                    .name("employee_start_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RosterError;
    use chrono::TimeZone;

    #[test]
    fn test_document_round_trip() {
        let availability = Availability::new(
            "e1",
            Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 9, 1, 17, 0, 0).unwrap(),
        );
        let doc = availability.into_document();
        let decoded = Availability::from_document(&doc).unwrap();
        assert_eq!(decoded, availability);
    }

    #[test]
    fn test_partitioned_by_employee() {
        let availability = Availability::new("e7", Utc::now(), Utc::now());
        assert_eq!(availability.partition_key(), "e7");
        assert_eq!(availability.row_key(), availability.id);
    }

    #[test]
    fn test_unparseable_date_is_store_error() {
        let mut doc = Availability::new("e1", Utc::now(), Utc::now()).into_document();
        doc.insert("start", "next tuesday");
        let err = Availability::from_document(&doc).unwrap_err();
        assert!(matches!(err, RosterError::Store(_)));
        assert!(err.to_string().contains("start"));
    }
}
