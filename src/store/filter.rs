//! Query filters
//!
//! Conjunctions of equality/range predicates over named fields, translated
//! to the store's native filter syntax (BSON filter documents).
//!
//! Date comparisons are expressed as string-encoded range comparisons over
//! the canonical literal format written by the schemas (fixed-width UTC, so
//! lexicographic order matches chronological order). Caller-supplied RFC3339
//! literals are re-encoded into that canonical form before any comparison;
//! an offset or missing-milliseconds literal would otherwise sort wrongly
//! against stored rows. A malformed date literal fails the whole query
//! before the store is touched.

use bson::{Bson, Document};
use chrono::{DateTime, Utc};

use crate::db::schemas::encode_ts;
use crate::types::{Result, RosterError};

/// Comparison operator for a single predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn mongo_operator(self) -> &'static str {
        match self {
            CompareOp::Eq => "$eq",
            CompareOp::Gt => "$gt",
            CompareOp::Ge => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Le => "$lte",
        }
    }

    fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
        }
    }
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Int(i64),
    /// RFC3339 date literal, validated before translation
    Date(String),
}

/// Re-encode an RFC3339 literal into the canonical stored form. Rows are
/// written by `encode_ts`, so comparisons only order correctly after the
/// literal is normalized to the same fixed-width UTC encoding.
fn canonical_date(field: &str, literal: &str) -> Result<String> {
    DateTime::parse_from_rfc3339(literal)
        .map(|dt| encode_ts(&dt.with_timezone(&Utc)))
        .map_err(|e| {
            RosterError::InvalidInput(format!(
                "malformed date literal '{}' for field '{}': {}",
                literal, field, e
            ))
        })
}

#[derive(Debug, Clone)]
struct Predicate {
    field: String,
    op: CompareOp,
    value: Value,
}

/// Conjunction of equality/range predicates
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// String equality
    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op: CompareOp::Eq,
            value: Value::Str(value.into()),
        });
        self
    }

    /// Integer comparison
    pub fn cmp_int(mut self, field: &str, op: CompareOp, value: i64) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op,
            value: Value::Int(value),
        });
        self
    }

    /// Date comparison against an RFC3339 literal. The literal is validated
    /// when the filter is translated; a malformed literal fails the whole
    /// query.
    pub fn cmp_date(mut self, field: &str, op: CompareOp, literal: impl Into<String>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op,
            value: Value::Date(literal.into()),
        });
        self
    }

    /// Validate all date literals in the filter
    pub fn validate(&self) -> Result<()> {
        for p in &self.predicates {
            if let Value::Date(ref literal) = p.value {
                canonical_date(&p.field, literal)?;
            }
        }
        Ok(())
    }

    /// Translate to a BSON filter document
    pub fn to_document(&self) -> Result<Document> {
        self.validate()?;

        // Predicates on the same field merge into one operator document,
        // e.g. { start: { "$gte": a, "$lte": b } }
        let mut fields: Vec<(String, Document)> = Vec::new();
        for p in &self.predicates {
            let value = match &p.value {
                Value::Str(s) => Bson::String(s.clone()),
                Value::Date(s) => Bson::String(canonical_date(&p.field, s)?),
                Value::Int(i) => Bson::Int64(*i),
            };
            match fields.iter_mut().find(|(f, _)| f == &p.field) {
                Some((_, ops)) => {
                    ops.insert(p.op.mongo_operator(), value);
                }
                None => {
                    let mut ops = Document::new();
                    ops.insert(p.op.mongo_operator(), value);
                    fields.push((p.field.clone(), ops));
                }
            }
        }

        let mut doc = Document::new();
        for (field, ops) in fields {
            doc.insert(field, ops);
        }
        Ok(doc)
    }

    /// Evaluate the filter against a property-bag row. Used by the in-memory
    /// store; callers must run `validate()` first (query does).
    pub fn matches(&self, doc: &Document) -> bool {
        self.predicates.iter().all(|p| {
            let Some(actual) = doc.get(&p.field) else {
                return false;
            };
            match (&p.value, actual) {
                (Value::Str(expected), Bson::String(actual)) => {
                    p.op.holds(actual.as_str().cmp(expected.as_str()))
                }
                (Value::Date(literal), Bson::String(actual)) => {
                    match canonical_date(&p.field, literal) {
                        Ok(expected) => p.op.holds(actual.as_str().cmp(expected.as_str())),
                        Err(_) => false,
                    }
                }
                (Value::Int(expected), Bson::Int64(actual)) => p.op.holds(actual.cmp(expected)),
                (Value::Int(expected), Bson::Int32(actual)) => {
                    p.op.holds(i64::from(*actual).cmp(expected))
                }
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_eq_translation() {
        let filter = Filter::new().eq("role_id", "r1");
        let doc = filter.to_document().unwrap();
        assert_eq!(doc, doc! { "role_id": { "$eq": "r1" } });
    }

    #[test]
    fn test_range_predicates_merge_per_field() {
        let filter = Filter::new()
            .cmp_date("start", CompareOp::Ge, "2026-01-01T00:00:00Z")
            .cmp_date("start", CompareOp::Le, "2026-02-01T00:00:00Z");
        let doc = filter.to_document().unwrap();
        assert_eq!(
            doc,
            doc! { "start": { "$gte": "2026-01-01T00:00:00.000Z", "$lte": "2026-02-01T00:00:00.000Z" } }
        );
    }

    #[test]
    fn test_offset_literal_normalized_to_utc() {
        // +02:00 bound is 08:00 UTC; a row at 08:30 UTC is inside the range
        let filter = Filter::new().cmp_date("start", CompareOp::Ge, "2026-01-01T10:00:00+02:00");
        assert!(filter.matches(&doc! { "start": "2026-01-01T08:30:00.000Z" }));
        assert!(!filter.matches(&doc! { "start": "2026-01-01T07:59:00.000Z" }));

        let doc = filter.to_document().unwrap();
        assert_eq!(doc, doc! { "start": { "$gte": "2026-01-01T08:00:00.000Z" } });
    }

    #[test]
    fn test_no_millis_literal_boundary_second() {
        // A literal without milliseconds must not exclude rows inside the
        // same second
        let filter = Filter::new().cmp_date("start", CompareOp::Ge, "2026-01-01T00:00:00Z");
        assert!(filter.matches(&doc! { "start": "2026-01-01T00:00:00.500Z" }));
        assert!(filter.matches(&doc! { "start": "2026-01-01T00:00:00.000Z" }));
        assert!(!filter.matches(&doc! { "start": "2025-12-31T23:59:59.999Z" }));
    }

    #[test]
    fn test_malformed_date_literal_fails_whole_query() {
        let filter = Filter::new()
            .eq("employee_id", "e1")
            .cmp_date("start", CompareOp::Ge, "not-a-date");
        let err = filter.to_document().unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(_)));
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_matches_string_equality() {
        let filter = Filter::new().eq("pk", "evt-1");
        assert!(filter.matches(&doc! { "pk": "evt-1", "rk": "s1" }));
        assert!(!filter.matches(&doc! { "pk": "evt-2", "rk": "s1" }));
        assert!(!filter.matches(&doc! { "rk": "s1" }));
    }

    #[test]
    fn test_matches_date_range_lexicographic() {
        let filter = Filter::new()
            .cmp_date("start", CompareOp::Ge, "2026-01-01T00:00:00.000Z")
            .cmp_date("start", CompareOp::Lt, "2026-06-01T00:00:00.000Z");
        assert!(filter.matches(&doc! { "start": "2026-03-15T09:30:00.000Z" }));
        assert!(!filter.matches(&doc! { "start": "2026-06-01T00:00:00.000Z" }));
        assert!(!filter.matches(&doc! { "start": "2025-12-31T23:59:59.000Z" }));
    }

    #[test]
    fn test_matches_int_comparison() {
        let filter = Filter::new().cmp_int("amount", CompareOp::Gt, 100);
        assert!(filter.matches(&doc! { "amount": 150_i64 }));
        assert!(filter.matches(&doc! { "amount": 150_i32 }));
        assert!(!filter.matches(&doc! { "amount": 100_i64 }));
    }

    #[test]
    fn test_type_mismatch_never_matches() {
        let filter = Filter::new().eq("amount", "100");
        assert!(!filter.matches(&doc! { "amount": 100_i64 }));
    }
}
