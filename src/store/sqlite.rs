use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;

use super::{RegistrationStore, StoreError};
use crate::registration::{RegistrationUpdate, UserId, UserRegistration};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(format!("migration failed: {e}"))
    }
}

/// SQLite-backed store keeping each registration as a JSON document row
pub struct SqliteRegistrationStore {
    pool: SqlitePool,
}

impl SqliteRegistrationStore {
    /// Connect, creating the database file and running migrations if asked
    pub async fn new(database_url: &str, auto_migrate: bool) -> Result<Self, StoreError> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn decode(user_id: &UserId, document: &str) -> Result<UserRegistration, StoreError> {
    let record: UserRegistration = serde_json::from_str(document)?;
    if &record.user_id != user_id {
        return Err(StoreError::Corrupt {
            user_id: user_id.to_string(),
            reason: format!("row holds document for {}", record.user_id),
        });
    }
    Ok(record)
}

#[async_trait]
impl RegistrationStore for SqliteRegistrationStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRegistration>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT document
            FROM registrations
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| decode(user_id, &row.get::<String, _>("document")))
            .transpose()
    }

    async fn merge(
        &self,
        user_id: &UserId,
        update: &RegistrationUpdate,
    ) -> Result<UserRegistration, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM registrations WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let mut record = match row {
            Some(row) => decode(user_id, &row.get::<String, _>("document"))?,
            None => UserRegistration::new(user_id.clone()),
        };
        record.apply(update);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO registrations (user_id, document, updated_at)
            VALUES (?1, ?2, datetime('now'))
            "#,
        )
        .bind(user_id.as_str())
        .bind(serde_json::to_string(&record)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }
}
