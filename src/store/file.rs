use async_trait::async_trait;
use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{RegistrationStore, StoreError};
use crate::registration::{RegistrationUpdate, UserId, UserRegistration};

/// One JSON document per user under a state directory.
///
/// Writes go to a temporary file that is renamed over the document, so a
/// reader never sees a half-written record. Read-merge-write cycles hold an
/// exclusive lock on a per-user lock file.
#[derive(Debug, Clone)]
pub struct FileRegistrationStore {
    directory: PathBuf,
}

impl FileRegistrationStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// User ids are opaque, so file names use their hex encoding
    fn document_path(&self, user_id: &UserId) -> PathBuf {
        self.directory
            .join(format!("{}.registration.json", hex::encode(user_id.as_str())))
    }

    fn lock_path(&self, user_id: &UserId) -> PathBuf {
        self.directory
            .join(format!("{}.lock", hex::encode(user_id.as_str())))
    }
}

fn read_document(path: &Path, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let record: UserRegistration = serde_json::from_str(&contents)?;
    if &record.user_id != user_id {
        return Err(StoreError::Corrupt {
            user_id: user_id.to_string(),
            reason: format!("document belongs to {}", record.user_id),
        });
    }

    Ok(Some(record))
}

fn write_document(path: &Path, record: &UserRegistration) -> Result<(), StoreError> {
    let serialized = serde_json::to_string_pretty(record)?;
    let temp_file = path.with_extension("json.tmp");
    fs::write(&temp_file, serialized)?;
    fs::rename(&temp_file, path)?;
    Ok(())
}

fn merge_document(
    directory: &Path,
    document: &Path,
    lock_path: &Path,
    user_id: &UserId,
    update: &RegistrationUpdate,
) -> Result<UserRegistration, StoreError> {
    fs::create_dir_all(directory)?;

    let lock_file: File = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock.write().map_err(|e| StoreError::Lock {
        reason: format!("{}: {e}", lock_path.display()),
    })?;

    let mut record =
        read_document(document, user_id)?.unwrap_or_else(|| UserRegistration::new(user_id.clone()));
    record.apply(update);
    write_document(document, &record)?;

    Ok(record)
}

#[async_trait]
impl RegistrationStore for FileRegistrationStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError> {
        let path = self.document_path(user_id);
        let user_id = user_id.clone();

        let record = tokio::task::spawn_blocking(move || read_document(&path, &user_id))
            .await
            .map_err(|e| StoreError::Backend(format!("read task failed: {e}")))??;

        debug!(found = record.is_some(), "Loaded registration document");
        Ok(record)
    }

    async fn merge(
        &self,
        user_id: &UserId,
        update: &RegistrationUpdate,
    ) -> Result<UserRegistration, StoreError> {
        let directory = self.directory.clone();
        let document = self.document_path(user_id);
        let lock_path = self.lock_path(user_id);
        let user = user_id.clone();
        let update = update.clone();

        let record = tokio::task::spawn_blocking(move || {
            merge_document(&directory, &document, &lock_path, &user, &update)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("merge task failed: {e}")))??;

        info!(
            user_id = %user_id,
            file = ?self.document_path(user_id),
            "Registration document merged"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{PaymentStatus, VerificationStatus};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_document_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRegistrationStore::new(temp_dir.path());

        assert!(store.get(&UserId::new("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let user = UserId::new("u1");

        let store = FileRegistrationStore::new(temp_dir.path());
        store
            .merge(
                &user,
                &RegistrationUpdate {
                    verification_status: Some(VerificationStatus::Completed),
                    verification_session_id: Some(Some("s1".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reopened = FileRegistrationStore::new(temp_dir.path());
        let record = reopened.get(&user).await.unwrap().unwrap();
        assert_eq!(record.verification_status, VerificationStatus::Completed);
        assert_eq!(record.verification_session_id.as_deref(), Some("s1"));
        assert_eq!(record.payment_status, PaymentStatus::NotConfigured);
    }

    #[tokio::test]
    async fn test_user_ids_cannot_escape_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRegistrationStore::new(temp_dir.path().join("state"));
        let user = UserId::new("../../etc/passwd");

        store.merge(&user, &RegistrationUpdate::default()).await.unwrap();

        let path = store.document_path(&user);
        assert!(path.starts_with(temp_dir.path().join("state")));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_document_for_other_user_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRegistrationStore::new(temp_dir.path());
        let user = UserId::new("u1");

        let foreign = UserRegistration::new(UserId::new("u2"));
        fs::write(
            store.document_path(&user),
            serde_json::to_string(&foreign).unwrap(),
        )
        .unwrap();

        let err = store.get(&user).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_merges_keep_every_field() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileRegistrationStore::new(temp_dir.path()));
        let user = UserId::new("u1");

        let verification = {
            let store = store.clone();
            let user = user.clone();
            tokio::spawn(async move {
                store
                    .merge(
                        &user,
                        &RegistrationUpdate {
                            verification_status: Some(VerificationStatus::Completed),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        let payment = {
            let store = store.clone();
            let user = user.clone();
            tokio::spawn(async move {
                store
                    .merge(
                        &user,
                        &RegistrationUpdate {
                            payment_status: Some(PaymentStatus::Configured),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };

        verification.await.unwrap().unwrap();
        payment.await.unwrap().unwrap();

        let record = store.get(&user).await.unwrap().unwrap();
        assert_eq!(record.verification_status, VerificationStatus::Completed);
        assert_eq!(record.payment_status, PaymentStatus::Configured);
    }
}
