//! Availability windows

use chrono::Utc;
use std::sync::Arc;

use crate::db::schemas::Availability;
use crate::store::{
    delete_row, get_row, put_row, query_rows, CompareOp, Filter, TableStore,
};
use crate::types::Result;
use crate::validate::validate_availability;

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn TableStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new availability window
    pub async fn create(&self, availability: Availability) -> Result<Availability> {
        validate_availability(&availability, Utc::now())?;
        put_row(&*self.store, &availability).await?;
        Ok(availability)
    }

    pub async fn get(&self, employee_id: &str, id: &str) -> Result<Availability> {
        get_row(&*self.store, employee_id, id).await
    }

    /// Windows for one employee, optionally bounded by RFC3339 start-date
    /// literals. Malformed literals fail the whole query.
    pub async fn list(
        &self,
        employee_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<Availability>> {
        let mut filter = Filter::new().eq("employee_id", employee_id);
        if let Some(from) = from {
            filter = filter.cmp_date("start", CompareOp::Ge, from);
        }
        if let Some(to) = to {
            filter = filter.cmp_date("start", CompareOp::Le, to);
        }
        query_rows(&*self.store, &filter).await
    }

    pub async fn delete(&self, employee_id: &str, id: &str) -> Result<()> {
        delete_row::<Availability>(&*self.store, employee_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;
    use crate::types::RosterError;
    use chrono::Duration;

    fn service() -> AvailabilityService {
        AvailabilityService::new(Arc::new(MemoryTableStore::new()))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let now = Utc::now();
        let created = service
            .create(Availability::new(
                "e1",
                now + Duration::hours(1),
                now + Duration::hours(2),
            ))
            .await
            .unwrap();

        let fetched = service.get("e1", &created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_invalid_window_never_reaches_store() {
        let service = service();
        let now = Utc::now();
        let err = service
            .create(Availability::new(
                "e1",
                now + Duration::hours(2),
                now + Duration::hours(1),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(_)));
        assert!(service.list("e1", None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_bounded_by_start_date() {
        let service = service();
        let now = Utc::now();
        let near = service
            .create(Availability::new(
                "e1",
                now + Duration::days(1),
                now + Duration::days(1) + Duration::hours(8),
            ))
            .await
            .unwrap();
        service
            .create(Availability::new(
                "e1",
                now + Duration::days(30),
                now + Duration::days(30) + Duration::hours(8),
            ))
            .await
            .unwrap();

        let upper = (now + Duration::days(7)).to_rfc3339();
        let windows = service.list("e1", None, Some(&upper)).await.unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].id, near.id);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let err = service().delete("e1", "nope").await.unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }
}
