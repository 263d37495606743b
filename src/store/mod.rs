//! Registration record storage
//!
//! The coordinator only needs two document operations: a point read by user
//! id and a partial merge-write by user id. Each backend guarantees that a
//! single merge is atomic for that one document; nothing here spans
//! documents.

use async_trait::async_trait;
use thiserror::Error;

use crate::registration::{RegistrationUpdate, UserId, UserRegistration};

pub mod file;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

pub use file::FileRegistrationStore;
pub use memory::InMemoryRegistrationStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteRegistrationStore;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },

    #[error("Stored document for {user_id} is corrupt: {reason}")]
    Corrupt { user_id: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Document store holding one registration record per user
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Point read. `Ok(None)` when no record exists for the user.
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError>;

    /// Merge the given fields into the user's record, creating a default
    /// record first if none exists, and return the merged record.
    ///
    /// Either the whole update lands or none of it does.
    async fn merge(
        &self,
        user_id: &UserId,
        update: &RegistrationUpdate,
    ) -> Result<UserRegistration, StoreError>;
}
