//! Relationship index
//!
//! Maintains the event-shift link table, simulating a join over the
//! denormalized store with a second partition scan. Link creation is
//! idempotent; `sync` reconciles the stored link set against a desired set,
//! deleting stale links instead of only ever adding.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::schemas::EventShiftLink;
use crate::store::{delete_row, put_row, query_rows, Filter, TableStore, FIELD_PK};
use crate::types::{Result, RosterError};

/// Store-backed index of event-shift links
#[derive(Clone)]
pub struct RelationshipIndex {
    store: Arc<dyn TableStore>,
}

impl RelationshipIndex {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Shift ids linked to an event. An event with no links resolves to an
    /// empty set, not an error.
    pub async fn links_for(&self, event_rk: &str) -> Result<BTreeSet<String>> {
        let links: Vec<EventShiftLink> =
            query_rows(&*self.store, &Filter::new().eq(FIELD_PK, event_rk)).await?;
        Ok(links.into_iter().map(|l| l.shift_id).collect())
    }

    /// Record that a shift belongs to an event. A duplicate insert is
    /// treated as success.
    pub async fn link(&self, event_rk: &str, shift_id: &str) -> Result<()> {
        match put_row(&*self.store, &EventShiftLink::new(event_rk, shift_id)).await {
            Err(RosterError::Conflict(_)) => Ok(()),
            other => other,
        }
    }

    /// Remove one link
    pub async fn unlink(&self, event_rk: &str, shift_id: &str) -> Result<()> {
        delete_row::<EventShiftLink>(&*self.store, event_rk, shift_id).await
    }

    /// Reconcile the stored link set with the desired one: missing links are
    /// inserted, stale links are deleted.
    pub async fn sync(&self, event_rk: &str, desired: &BTreeSet<String>) -> Result<()> {
        let current = self.links_for(event_rk).await?;

        for shift_id in desired.difference(&current) {
            self.link(event_rk, shift_id).await?;
        }
        for shift_id in current.difference(desired) {
            self.unlink(event_rk, shift_id).await?;
        }
        Ok(())
    }
}
