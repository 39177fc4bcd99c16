//! Duty assignment generator
//!
//! Expands a (shift, role) pair into one `Incomplete` duty-assignment row
//! per catalog duty for the role. Creation is fail-fast and not rolled back:
//! the backing store offers only single-partition atomicity, so a failure
//! partway through leaves the rows written so far in place and the whole
//! call surfaces one error naming the failing row. Re-running a fully
//! created batch surfaces `Conflict` on the first row.

use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{Duty, DutyAssignment};
use crate::store::{put_row, query_rows, Filter, TableStore};
use crate::types::{Result, RosterError};

/// Generates duty-assignment batches; the only component that creates
/// assignment rows.
#[derive(Clone)]
pub struct AssignmentGenerator {
    store: Arc<dyn TableStore>,
}

impl AssignmentGenerator {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Create one `Incomplete` assignment per duty in the role's catalog.
    ///
    /// A role with zero duties produces an empty batch, not an error.
    pub async fn generate(&self, shift_id: &str, role_id: &str) -> Result<Vec<DutyAssignment>> {
        let duties: Vec<Duty> =
            query_rows(&*self.store, &Filter::new().eq("role_id", role_id)).await?;

        if duties.is_empty() {
            debug!("role {} has no catalog duties, nothing to generate", role_id);
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(duties.len());
        for duty in &duties {
            let assignment = DutyAssignment::incomplete(shift_id, &duty.id);
            put_row(&*self.store, &assignment)
                .await
                .map_err(|e| match e {
                    RosterError::Conflict(_) => RosterError::Conflict(format!(
                        "assignment ({}, {}) already exists",
                        shift_id, duty.id
                    )),
                    RosterError::Store(msg) => RosterError::Store(format!(
                        "writing assignment ({}, {}): {}",
                        shift_id, duty.id, msg
                    )),
                    other => other,
                })?;
            created.push(assignment);
        }

        info!(
            "generated {} assignments for shift {} (role {})",
            created.len(),
            shift_id,
            role_id
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{AssignmentStatus, ASSIGNMENT_TABLE};
    use crate::store::{get_row, MemoryTableStore};
    use std::collections::BTreeSet;

    async fn seed_duty(store: &dyn TableStore, id: &str, role_id: &str) {
        let duty = Duty {
            id: id.to_string(),
            role_id: role_id.to_string(),
            name: format!("duty {}", id),
            description: String::new(),
        };
        put_row(store, &duty).await.unwrap();
    }

    #[tokio::test]
    async fn test_one_row_per_catalog_duty() {
        let store = Arc::new(MemoryTableStore::new());
        seed_duty(&*store, "d1", "r1").await;
        seed_duty(&*store, "d2", "r1").await;
        seed_duty(&*store, "d3", "r2").await;

        let generator = AssignmentGenerator::new(store.clone());
        let batch = generator.generate("s1", "r1").await.unwrap();

        assert_eq!(batch.len(), 2);
        let duty_ids: BTreeSet<_> = batch.iter().map(|a| a.duty_id.clone()).collect();
        assert_eq!(duty_ids.len(), 2, "no duplicate rows");
        for assignment in &batch {
            assert_eq!(assignment.shift_id, "s1");
            assert_eq!(assignment.status, AssignmentStatus::Incomplete);
            assert_eq!(assignment.image_url, None);
            assert_eq!(assignment.note, None);
        }
        assert_eq!(store.row_count(ASSIGNMENT_TABLE).await, 2);
    }

    #[tokio::test]
    async fn test_persisted_rows_round_trip() {
        let store = Arc::new(MemoryTableStore::new());
        seed_duty(&*store, "d1", "r1").await;

        AssignmentGenerator::new(store.clone())
            .generate("s1", "r1")
            .await
            .unwrap();

        let stored: DutyAssignment = get_row(&*store, "s1", "d1").await.unwrap();
        assert_eq!(stored, DutyAssignment::incomplete("s1", "d1"));
    }

    #[tokio::test]
    async fn test_zero_duties_is_empty_not_error() {
        let store = Arc::new(MemoryTableStore::new());
        let batch = AssignmentGenerator::new(store.clone())
            .generate("s1", "r-empty")
            .await
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(store.row_count(ASSIGNMENT_TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_rerun_surfaces_conflict() {
        let store = Arc::new(MemoryTableStore::new());
        seed_duty(&*store, "d1", "r1").await;
        seed_duty(&*store, "d2", "r1").await;

        let generator = AssignmentGenerator::new(store.clone());
        generator.generate("s1", "r1").await.unwrap();

        let err = generator.generate("s1", "r1").await.unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_written_rows() {
        let store = Arc::new(MemoryTableStore::new());
        seed_duty(&*store, "d1", "r1").await;
        seed_duty(&*store, "d2", "r1").await;

        // A row from a previous partial run already exists for d2; the batch
        // fails there and d1's row is NOT rolled back.
        put_row(&*store, &DutyAssignment::incomplete("s1", "d2"))
            .await
            .unwrap();

        let generator = AssignmentGenerator::new(store.clone());
        let err = generator.generate("s1", "r1").await.unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
        assert!(err.to_string().contains("d2"));

        // d1 was written before the failure and stays
        assert!(get_row::<DutyAssignment>(&*store, "s1", "d1").await.is_ok());
        assert_eq!(store.row_count(ASSIGNMENT_TABLE).await, 2);
    }
}
