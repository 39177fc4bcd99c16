//! Duty catalog

use std::sync::Arc;

use crate::db::schemas::{Duty, DUTY_PARTITION};
use crate::store::{get_row, put_row, query_rows, Filter, TableStore, FIELD_PK};
use crate::types::{Result, RosterError};

#[derive(Clone)]
pub struct DutyService {
    store: Arc<dyn TableStore>,
}

impl DutyService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Persist a new catalog entry
    pub async fn create(&self, duty: Duty) -> Result<Duty> {
        if duty.role_id.trim().is_empty() {
            return Err(RosterError::InvalidInput(
                "role id must not be empty".to_string(),
            ));
        }
        if duty.name.trim().is_empty() {
            return Err(RosterError::InvalidInput(
                "duty name must not be empty".to_string(),
            ));
        }
        put_row(&*self.store, &duty).await?;
        Ok(duty)
    }

    pub async fn get(&self, id: &str) -> Result<Duty> {
        get_row(&*self.store, DUTY_PARTITION, id).await
    }

    /// The duty catalog for one role
    pub async fn list_for_role(&self, role_id: &str) -> Result<Vec<Duty>> {
        query_rows(&*self.store, &Filter::new().eq("role_id", role_id)).await
    }

    /// The whole catalog
    pub async fn list_all(&self) -> Result<Vec<Duty>> {
        query_rows(&*self.store, &Filter::new().eq(FIELD_PK, DUTY_PARTITION)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;

    fn service() -> DutyService {
        DutyService::new(Arc::new(MemoryTableStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_list_by_role() {
        let service = service();
        service.create(Duty::new("r1", "Open bar", "")).await.unwrap();
        service.create(Duty::new("r1", "Close bar", "")).await.unwrap();
        service.create(Duty::new("r2", "Sound check", "")).await.unwrap();

        assert_eq!(service.list_for_role("r1").await.unwrap().len(), 2);
        assert_eq!(service.list_for_role("r3").await.unwrap().len(), 0);
        assert_eq!(service.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let err = service().create(Duty::new("r1", "  ", "")).await.unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(_)));
    }
}
