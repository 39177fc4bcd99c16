//! Event-shift relationship row
//!
//! Pure index row: partition is the owning event's row key, row key is the
//! linked shift id. No lifecycle beyond create/delete alongside the owning
//! event's shift set.

use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::db::schemas::req_str;
use crate::store::TableRow;
use crate::types::Result;

/// Table name for event-shift links
pub const LINK_TABLE: &str = "event_shift_links";

/// One link recording that a shift belongs to an event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventShiftLink {
    pub event_rk: String,
    pub shift_id: String,
}

impl EventShiftLink {
    pub fn new(event_rk: impl Into<String>, shift_id: impl Into<String>) -> Self {
        Self {
            event_rk: event_rk.into(),
            shift_id: shift_id.into(),
        }
    }
}

impl TableRow for EventShiftLink {
    const TABLE: &'static str = LINK_TABLE;

    fn partition_key(&self) -> String {
        self.event_rk.clone()
    }

    fn row_key(&self) -> String {
        self.shift_id.clone()
    }

    fn into_document(&self) -> Document {
        doc! {
            "event_rk": &self.event_rk,
            "shift_id": &self.shift_id,
        }
    }

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Self {
            event_rk: req_str(doc, "event_rk")?,
            shift_id: req_str(doc, "shift_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_event_then_shift() {
        let link = EventShiftLink::new("evt-1", "s1");
        assert_eq!(link.partition_key(), "evt-1");
        assert_eq!(link.row_key(), "s1");
    }

    #[test]
    fn test_document_round_trip() {
        let link = EventShiftLink::new("evt-1", "s1");
        assert_eq!(
            EventShiftLink::from_document(&link.into_document()).unwrap(),
            link
        );
    }
}
