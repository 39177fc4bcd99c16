//! Events
//!
//! Event rows plus their shift links. The shift-id list on a returned event
//! is always resolved through the relationship index, never read from the
//! event row.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::schemas::{Event, EVENT_PARTITION};
use crate::links::RelationshipIndex;
use crate::store::{
    delete_row, get_row, put_row, query_rows, replace_row, CompareOp, Filter, TableStore, FIELD_PK,
};
use crate::types::{Result, RosterError};
use crate::validate::validate_event;

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn TableStore>,
    links: RelationshipIndex,
}

impl EventService {
    pub fn new(store: Arc<dyn TableStore>, links: RelationshipIndex) -> Self {
        Self { store, links }
    }

    /// Persist a new event and link its shift set
    pub async fn create(&self, event: Event) -> Result<Event> {
        validate_event(&event)?;
        put_row(&*self.store, &event).await?;
        let desired: BTreeSet<String> = event.shift_ids.iter().cloned().collect();
        self.links.sync(&event.id, &desired).await?;
        self.resolve(event).await
    }

    /// Fetch an event with its shift ids resolved
    pub async fn get(&self, id: &str) -> Result<Event> {
        let event: Event = get_row(&*self.store, EVENT_PARTITION, id).await?;
        self.resolve(event).await
    }

    /// Replace an event row and reconcile its shift links: links for shifts
    /// no longer in the set are retracted, new ones are added.
    pub async fn update(&self, event: Event) -> Result<Event> {
        validate_event(&event)?;
        replace_row(&*self.store, &event).await?;
        let desired: BTreeSet<String> = event.shift_ids.iter().cloned().collect();
        self.links.sync(&event.id, &desired).await?;
        self.resolve(event).await
    }

    /// Events, optionally narrowed by status literal and start-date range
    pub async fn list(
        &self,
        status: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<Event>> {
        let mut filter = Filter::new().eq(FIELD_PK, EVENT_PARTITION);
        if let Some(literal) = status {
            // Reject unknown literals before they reach the store
            let parsed: crate::db::schemas::EventStatus = literal
                .parse()
                .map_err(|_| RosterError::InvalidInput(format!("unknown event status '{}'", literal)))?;
            filter = filter.eq("status", parsed.to_string());
        }
        if let Some(from) = from {
            filter = filter.cmp_date("start", CompareOp::Ge, from);
        }
        if let Some(to) = to {
            filter = filter.cmp_date("start", CompareOp::Le, to);
        }

        let events: Vec<Event> = query_rows(&*self.store, &filter).await?;
        let mut resolved = Vec::with_capacity(events.len());
        for event in events {
            resolved.push(self.resolve(event).await?);
        }
        Ok(resolved)
    }

    /// Delete an event and its shift links
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.links.sync(id, &BTreeSet::new()).await?;
        delete_row::<Event>(&*self.store, EVENT_PARTITION, id).await
    }

    async fn resolve(&self, mut event: Event) -> Result<Event> {
        event.shift_ids = self.links.links_for(&event.id).await?.into_iter().collect();
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ContactPerson, EventStatus};
    use crate::store::MemoryTableStore;
    use chrono::{Duration, Utc};

    fn service() -> EventService {
        let store: Arc<dyn TableStore> = Arc::new(MemoryTableStore::new());
        EventService::new(store.clone(), RelationshipIndex::new(store))
    }

    fn sample_event(shift_ids: &[&str]) -> Event {
        let now = Utc::now();
        let mut event = Event::new(
            now + Duration::days(3),
            now + Duration::days(3) + Duration::hours(6),
            "12 Quay St",
            "Harbour Hall",
            "Corporate dinner",
            250_000,
            ContactPerson::default(),
        );
        event.shift_ids = shift_ids.iter().map(|s| s.to_string()).collect();
        event
    }

    #[tokio::test]
    async fn test_create_links_shift_set() {
        let service = service();
        let created = service.create(sample_event(&["s1", "s2"])).await.unwrap();
        assert_eq!(created.shift_ids, vec!["s1", "s2"]);

        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched.shift_ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_get_without_links_is_empty_list() {
        let service = service();
        let created = service.create(sample_event(&[])).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();
        assert!(fetched.shift_ids.is_empty());
    }

    #[tokio::test]
    async fn test_update_retracts_stale_links() {
        let service = service();
        let mut event = service.create(sample_event(&["s1", "s2"])).await.unwrap();

        event.shift_ids = vec!["s2".to_string(), "s3".to_string()];
        let updated = service.update(event).await.unwrap();
        assert_eq!(updated.shift_ids, vec!["s2", "s3"]);

        let fetched = service.get(&updated.id).await.unwrap();
        assert_eq!(fetched.shift_ids, vec!["s2", "s3"]);
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let service = service();
        let event = service.create(sample_event(&[])).await.unwrap();

        let planned = service.list(Some("Planned"), None, None).await.unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].id, event.id);
        assert_eq!(planned[0].status, EventStatus::Planned);

        assert!(service
            .list(Some("Cancelled"), None, None)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            service.list(Some("Someday"), None, None).await,
            Err(RosterError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_links() {
        let service = service();
        let created = service.create(sample_event(&["s1"])).await.unwrap();
        service.delete(&created.id).await.unwrap();

        assert!(matches!(
            service.get(&created.id).await,
            Err(RosterError::NotFound(_))
        ));
        // Links are gone as well: recreating the id sees an empty set
        assert!(service.links.links_for(&created.id).await.unwrap().is_empty());
    }
}
