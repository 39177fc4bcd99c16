//! Duty assignment schema
//!
//! Composite key: shift id is the partition, duty id the row. Created in
//! bulk by the generator when a clock-in is processed, mutated by the
//! complete/annotate path, deleted only explicitly.

use bson::{doc, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::schemas::{opt_str, req_str};
use crate::store::TableRow;
use crate::types::{Result, RosterError};

/// Table name for duty assignments
pub const ASSIGNMENT_TABLE: &str = "duty_assignments";

/// Completion state of a duty assignment.
///
/// `Incomplete -> Completed` is the only transition; `Completed` is terminal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentStatus {
    Completed,
    Incomplete,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Completed => write!(f, "Completed"),
            AssignmentStatus::Incomplete => write!(f, "Incomplete"),
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Completed" => Ok(AssignmentStatus::Completed),
            "Incomplete" => Ok(AssignmentStatus::Incomplete),
            other => Err(RosterError::InvalidInput(format!(
                "unknown assignment status '{}'",
                other
            ))),
        }
    }
}

/// One duty to be carried out on one shift
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DutyAssignment {
    pub shift_id: String,
    pub duty_id: String,
    pub status: AssignmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DutyAssignment {
    /// Fresh assignment as written by the generator
    pub fn incomplete(shift_id: impl Into<String>, duty_id: impl Into<String>) -> Self {
        Self {
            shift_id: shift_id.into(),
            duty_id: duty_id.into(),
            status: AssignmentStatus::Incomplete,
            image_url: None,
            note: None,
        }
    }
}

impl TableRow for DutyAssignment {
    const TABLE: &'static str = ASSIGNMENT_TABLE;

    fn partition_key(&self) -> String {
        self.shift_id.clone()
    }

    fn row_key(&self) -> String {
        self.duty_id.clone()
    }

    fn into_document(&self) -> Document {
        let mut doc = doc! {
            "shift_id": &self.shift_id,
            "duty_id": &self.duty_id,
            "status": self.status.to_string(),
        };
        // Optional fields are absent when unset so nil-vs-present survives
        // a round trip
        if let Some(ref image_url) = self.image_url {
            doc.insert("image_url", image_url);
        }
        if let Some(ref note) = self.note {
            doc.insert("note", note);
        }
        doc
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let status_literal = req_str(doc, "status")?;
        let status = status_literal
            .parse::<AssignmentStatus>()
            .map_err(|e| RosterError::bad_field("status", e))?;

        Ok(Self {
            shift_id: req_str(doc, "shift_id")?,
            duty_id: req_str(doc, "duty_id")?,
            status,
            image_url: opt_str(doc, "image_url")?,
            note: opt_str(doc, "note")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_literals() {
        assert_eq!(
            "Completed".parse::<AssignmentStatus>().unwrap(),
            AssignmentStatus::Completed
        );
        assert_eq!(
            "Incomplete".parse::<AssignmentStatus>().unwrap(),
            AssignmentStatus::Incomplete
        );
    }

    #[test]
    fn test_unknown_status_literal_rejected() {
        for bad in ["Done", "completed", "INCOMPLETE", ""] {
            assert!(matches!(
                bad.parse::<AssignmentStatus>(),
                Err(RosterError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_round_trip_without_optionals() {
        let assignment = DutyAssignment::incomplete("s1", "d1");
        let doc = assignment.into_document();
        assert!(doc.get("image_url").is_none());
        assert!(doc.get("note").is_none());

        let decoded = DutyAssignment::from_document(&doc).unwrap();
        assert_eq!(decoded, assignment);
        assert_eq!(decoded.image_url, None);
        assert_eq!(decoded.note, None);
    }

    #[test]
    fn test_round_trip_with_optionals() {
        let assignment = DutyAssignment {
            shift_id: "s1".to_string(),
            duty_id: "d1".to_string(),
            status: AssignmentStatus::Completed,
            image_url: Some("https://img.example/proof.jpg".to_string()),
            note: Some("restocked twice".to_string()),
        };
        let decoded = DutyAssignment::from_document(&assignment.into_document()).unwrap();
        assert_eq!(decoded, assignment);
    }

    #[test]
    fn test_bad_stored_status_is_store_error() {
        let mut doc = DutyAssignment::incomplete("s1", "d1").into_document();
        doc.insert("status", "Finished");
        let err = DutyAssignment::from_document(&doc).unwrap_err();
        assert!(matches!(err, RosterError::Store(_)));
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_keyed_by_shift_and_duty() {
        let assignment = DutyAssignment::incomplete("s9", "d4");
        assert_eq!(assignment.partition_key(), "s9");
        assert_eq!(assignment.row_key(), "d4");
    }
}
