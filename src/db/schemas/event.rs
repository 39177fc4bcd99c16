//! Event schema
//!
//! Events live under one grouping partition. The associated shift ids are
//! derived through the relationship index at read time and are never stored
//! on the event row itself.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::schemas::{encode_ts, opt_str, req_date, req_i64, req_str, IntoIndexes};
use crate::store::TableRow;
use crate::types::{Result, RosterError};

/// Table name for events
pub const EVENT_TABLE: &str = "events";

/// Grouping partition for all event rows
pub const EVENT_PARTITION: &str = "events";

/// Lifecycle status of an event
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Planned,
    Ongoing,
    Completed,
    Cancelled,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = match self {
            EventStatus::Planned => "Planned",
            EventStatus::Ongoing => "Ongoing",
            EventStatus::Completed => "Completed",
            EventStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", literal)
    }
}

impl FromStr for EventStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Planned" => Ok(EventStatus::Planned),
            "Ongoing" => Ok(EventStatus::Ongoing),
            "Completed" => Ok(EventStatus::Completed),
            "Cancelled" => Ok(EventStatus::Cancelled),
            other => Err(RosterError::InvalidInput(format!(
                "unknown event status '{}'",
                other
            ))),
        }
    }
}

/// Contact person associated with an event
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactPerson {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A scheduled event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub address: String,
    pub venue: String,
    pub description: String,
    /// Monetary amount in minor units
    pub amount: i64,
    pub status: EventStatus,
    pub contact: ContactPerson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Shift ids resolved via the relationship index; derived, never stored
    /// on this row
    #[serde(default)]
    pub shift_ids: Vec<String>,
}

impl Event {
    /// New planned event with a generated id
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        address: impl Into<String>,
        venue: impl Into<String>,
        description: impl Into<String>,
        amount: i64,
        contact: ContactPerson,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start,
            end,
            address: address.into(),
            venue: venue.into(),
            description: description.into(),
            amount,
            status: EventStatus::Planned,
            contact,
            note: None,
            shift_ids: Vec::new(),
        }
    }
}

impl TableRow for Event {
    const TABLE: &'static str = EVENT_TABLE;

    fn partition_key(&self) -> String {
        EVENT_PARTITION.to_string()
    }

    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn into_document(&self) -> Document {
        // shift_ids is intentionally not written; the relationship index is
        // the source of truth for event-shift links
        let mut doc = doc! {
            "id": &self.id,
            "start": encode_ts(&self.start),
            "end": encode_ts(&self.end),
            "address": &self.address,
            "venue": &self.venue,
            "description": &self.description,
            "amount": self.amount,
            "status": self.status.to_string(),
            "contact_first_name": &self.contact.first_name,
            "contact_last_name": &self.contact.last_name,
            "contact_email": &self.contact.email,
        };
        if let Some(ref note) = self.note {
            doc.insert("note", note);
        }
        doc
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let status_literal = req_str(doc, "status")?;
        let status = status_literal
            .parse::<EventStatus>()
            .map_err(|e| RosterError::bad_field("status", e))?;

        Ok(Self {
            id: req_str(doc, "id")?,
            start: req_date(doc, "start")?,
            end: req_date(doc, "end")?,
            address: req_str(doc, "address")?,
            venue: req_str(doc, "venue")?,
            description: req_str(doc, "description")?,
            amount: req_i64(doc, "amount")?,
            status,
            contact: ContactPerson {
                first_name: req_str(doc, "contact_first_name")?,
                last_name: req_str(doc, "contact_last_name")?,
                email: req_str(doc, "contact_email")?,
            },
            note: opt_str(doc, "note")?,
            shift_ids: Vec::new(),
        })
    }
}

impl IntoIndexes for Event {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "status": 1, "start": 1 },
            Some(
                IndexOptions::builder()
                    .name("status_start_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        Event::new(
            Utc.with_ymd_and_hms(2026, 10, 3, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 3, 23, 30, 0).unwrap(),
            "12 Quay St",
            "Harbour Hall",
            "Corporate dinner",
            250_000,
            ContactPerson {
                first_name: "Mara".to_string(),
                last_name: "Lindqvist".to_string(),
                email: "mara@example.com".to_string(),
            },
        )
    }

    #[test]
    fn test_document_round_trip() {
        let event = sample_event();
        let decoded = Event::from_document(&event.into_document()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_shift_ids_never_stored() {
        let mut event = sample_event();
        event.shift_ids = vec!["s1".to_string(), "s2".to_string()];
        let doc = event.into_document();
        assert!(doc.get("shift_ids").is_none());

        let decoded = Event::from_document(&doc).unwrap();
        assert!(decoded.shift_ids.is_empty());
    }

    #[test]
    fn test_status_literals() {
        for (literal, status) in [
            ("Planned", EventStatus::Planned),
            ("Ongoing", EventStatus::Ongoing),
            ("Completed", EventStatus::Completed),
            ("Cancelled", EventStatus::Cancelled),
        ] {
            assert_eq!(literal.parse::<EventStatus>().unwrap(), status);
            assert_eq!(status.to_string(), literal);
        }
        assert!("Postponed".parse::<EventStatus>().is_err());
    }
}
