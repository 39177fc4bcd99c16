//! Duty assignments
//!
//! Reads and the complete/annotate path. Batch creation belongs exclusively
//! to the generator.

use std::sync::Arc;

use crate::db::schemas::{AssignmentStatus, DutyAssignment};
use crate::store::{delete_row, get_row, query_rows, replace_row, Filter, TableStore};
use crate::types::{Result, RosterError};
use crate::validate::parse_assignment_status;

#[derive(Clone)]
pub struct AssignmentService {
    store: Arc<dyn TableStore>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, shift_id: &str, duty_id: &str) -> Result<DutyAssignment> {
        get_row(&*self.store, shift_id, duty_id).await
    }

    /// Every assignment on one shift
    pub async fn list_for_shift(&self, shift_id: &str) -> Result<Vec<DutyAssignment>> {
        query_rows(&*self.store, &Filter::new().eq("shift_id", shift_id)).await
    }

    /// Update status and annotations. `Incomplete -> Completed` is the only
    /// status transition; a completed assignment cannot be reopened.
    pub async fn update(
        &self,
        shift_id: &str,
        duty_id: &str,
        status_literal: &str,
        image_url: Option<String>,
        note: Option<String>,
    ) -> Result<DutyAssignment> {
        let status = parse_assignment_status(status_literal)?;
        let mut assignment = self.get(shift_id, duty_id).await?;

        if assignment.status == AssignmentStatus::Completed
            && status == AssignmentStatus::Incomplete
        {
            return Err(RosterError::InvalidInput(
                "a completed assignment cannot be reopened".to_string(),
            ));
        }

        assignment.status = status;
        if image_url.is_some() {
            assignment.image_url = image_url;
        }
        if note.is_some() {
            assignment.note = note;
        }

        replace_row(&*self.store, &assignment).await?;
        Ok(assignment)
    }

    /// Explicit delete; assignments are never removed any other way
    pub async fn delete(&self, shift_id: &str, duty_id: &str) -> Result<()> {
        delete_row::<DutyAssignment>(&*self.store, shift_id, duty_id).await
    }
}
