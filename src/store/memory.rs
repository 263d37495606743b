use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{RegistrationStore, StoreError};
use crate::registration::{RegistrationUpdate, UserId, UserRegistration};

/// Process-local store, used by tests and the `memory` storage backend
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    records: RwLock<HashMap<UserId, UserRegistration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the coordinator
    pub async fn insert(&self, record: UserRegistration) {
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn merge(
        &self,
        user_id: &UserId,
        update: &RegistrationUpdate,
    ) -> Result<UserRegistration, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(user_id.clone())
            .or_insert_with(|| UserRegistration::new(user_id.clone()));
        record.apply(update);
        Ok(record.clone())
    }
}
