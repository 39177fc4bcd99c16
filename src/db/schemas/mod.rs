//! Entity schemas
//!
//! Typed records for every table, each owning its mapping to and from the
//! store's property-bag representation. Decode helpers return field-level
//! store errors instead of panicking.

pub mod assignment;
pub mod availability;
pub mod duty;
pub mod event;
pub mod link;

pub use assignment::{AssignmentStatus, DutyAssignment, ASSIGNMENT_TABLE};
pub use availability::{Availability, AVAILABILITY_TABLE};
pub use duty::{Duty, DUTY_PARTITION, DUTY_TABLE};
pub use event::{ContactPerson, Event, EventStatus, EVENT_PARTITION, EVENT_TABLE};
pub use link::{EventShiftLink, LINK_TABLE};

use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;

use crate::types::{Result, RosterError};

/// Every table managed by the store, used for index setup
pub const ALL_TABLES: &[&str] = &[
    AVAILABILITY_TABLE,
    DUTY_TABLE,
    ASSIGNMENT_TABLE,
    EVENT_TABLE,
    LINK_TABLE,
];

/// Trait for schemas that provide secondary index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Canonical date literal format stored in rows: fixed-width UTC RFC3339,
/// so lexicographic order matches chronological order and the store's
/// string range comparisons work on dates.
pub fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a stored date literal; failure is a field-level store error
pub fn decode_ts(field: &str, literal: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(literal)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RosterError::bad_field(field, e))
}

/// Required string field
pub(crate) fn req_str(doc: &Document, field: &str) -> Result<String> {
    doc.get_str(field)
        .map(str::to_owned)
        .map_err(|e| RosterError::bad_field(field, e))
}

/// Optional string field; absent and null both decode to `None`, a value of
/// another type is a field error
pub(crate) fn opt_str(doc: &Document, field: &str) -> Result<Option<String>> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(RosterError::bad_field(
            field,
            format!("expected string, found {:?}", other.element_type()),
        )),
    }
}

/// Required integer field
pub(crate) fn req_i64(doc: &Document, field: &str) -> Result<i64> {
    match doc.get(field) {
        Some(Bson::Int64(i)) => Ok(*i),
        Some(Bson::Int32(i)) => Ok(i64::from(*i)),
        Some(other) => Err(RosterError::bad_field(
            field,
            format!("expected integer, found {:?}", other.element_type()),
        )),
        None => Err(RosterError::bad_field(field, "missing")),
    }
}

/// Required date field in the canonical literal format
pub(crate) fn req_date(doc: &Document, field: &str) -> Result<DateTime<Utc>> {
    let literal = req_str(doc, field)?;
    decode_ts(field, &literal)
}
