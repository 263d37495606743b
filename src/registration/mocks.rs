// Test doubles for the coordinator's collaborators - no side effects

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::registration::clock::Clock;
use crate::registration::types::*;
use crate::store::{RegistrationStore, StoreError};

/// Store operations observed by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Get { user_id: UserId },
    Merge { user_id: UserId, update: RegistrationUpdate },
}

/// In-memory store that records every call and can be told to fail writes
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub records: Mutex<HashMap<UserId, UserRegistration>>,
    pub executed_commands: Mutex<Vec<StoreCommand>>,
    pub fail_writes: Mutex<bool>,
    pub fail_reads: Mutex<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: UserRegistration) -> Self {
        let store = Self::new();
        store.seed(record);
        store
    }

    pub fn seed(&self, record: UserRegistration) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    pub fn record(&self, user_id: &str) -> Option<UserRegistration> {
        self.records.lock().unwrap().get(&UserId::new(user_id)).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn get_executed_commands(&self) -> Vec<StoreCommand> {
        self.executed_commands.lock().unwrap().clone()
    }

    pub fn merge_count(&self) -> usize {
        self.executed_commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, StoreCommand::Merge { .. }))
            .count()
    }
}

#[async_trait]
impl RegistrationStore for RecordingStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError> {
        self.executed_commands.lock().unwrap().push(StoreCommand::Get {
            user_id: user_id.clone(),
        });
        if *self.fail_reads.lock().unwrap() {
            return Err(StoreError::Backend("store unreachable".to_string()));
        }
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn merge(
        &self,
        user_id: &UserId,
        update: &RegistrationUpdate,
    ) -> Result<UserRegistration, StoreError> {
        self.executed_commands.lock().unwrap().push(StoreCommand::Merge {
            user_id: user_id.clone(),
            update: update.clone(),
        });
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Backend("write rejected".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id.clone())
            .or_insert_with(|| UserRegistration::new(user_id.clone()));
        record.apply(update);
        Ok(record.clone())
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Moves forward one minute on every reading
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::minutes(1);
        now
    }
}
