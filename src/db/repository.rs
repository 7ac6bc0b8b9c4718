use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::WHEEL_PARTITION_KEY;
use crate::db::models::{WheelRecord, WheelRow};
use crate::error::{AppError, Result};
use crate::types::ChannelKey;

/// Durable backing for wheels.
///
/// `save` is compare-and-swap on the record version: `expected_version` is the
/// version the caller loaded (`None` when no record existed). A stale version
/// fails with [`AppError::Conflict`] instead of overwriting the newer record.
pub trait WheelRepository: Send + Sync + 'static {
    fn load(&self, key: &ChannelKey) -> impl Future<Output = Result<Option<WheelRecord>>> + Send;

    /// Persist `options` and return the new version.
    fn save(
        &self,
        key: &ChannelKey,
        options: &[String],
        expected_version: Option<i64>,
    ) -> impl Future<Output = Result<i64>> + Send;
}

/// `wheels` table in SQLite.
#[derive(Clone)]
pub struct SqliteWheelRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteWheelRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file and apply migrations.
    pub async fn open(db_path: &str) -> Result<Self> {
        let pool = sqlx::SqlitePool::connect(&format!("sqlite://{db_path}?mode=rwc")).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    #[cfg(test)]
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}

impl WheelRepository for SqliteWheelRepository {
    async fn load(&self, key: &ChannelKey) -> Result<Option<WheelRecord>> {
        let row = sqlx::query_as::<_, WheelRow>(
            r#"
            SELECT partition_key, row_key, options_json, timestamp, version
            FROM wheels
            WHERE partition_key = ? AND row_key = ?
            "#,
        )
        .bind(WHEEL_PARTITION_KEY)
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                debug!(partition = %row.partition_key, row = %row.row_key, version = row.version, "wheel record read");
                Ok(Some(WheelRecord::try_from(row)?))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        key: &ChannelKey,
        options: &[String],
        expected_version: Option<i64>,
    ) -> Result<i64> {
        let options_json = serde_json::to_string(options)?;
        let timestamp = now_ms();

        let (result, new_version) = match expected_version {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO wheels (partition_key, row_key, options_json, timestamp, version)
                    VALUES (?, ?, ?, ?, 1)
                    ON CONFLICT(partition_key, row_key) DO NOTHING
                    "#,
                )
                .bind(WHEEL_PARTITION_KEY)
                .bind(key.as_str())
                .bind(&options_json)
                .bind(timestamp)
                .execute(&self.pool)
                .await?;
                (result, 1)
            }
            Some(version) => {
                let result = sqlx::query(
                    r#"
                    UPDATE wheels
                    SET options_json = ?, timestamp = ?, version = version + 1
                    WHERE partition_key = ? AND row_key = ? AND version = ?
                    "#,
                )
                .bind(&options_json)
                .bind(timestamp)
                .bind(WHEEL_PARTITION_KEY)
                .bind(key.as_str())
                .bind(version)
                .execute(&self.pool)
                .await?;
                (result, version + 1)
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "wheel {key} changed since version {expected_version:?} was loaded"
            )));
        }

        debug!(key = %key, version = new_version, count = options.len(), "wheel persisted");
        Ok(new_version)
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ---------------------------------------------------------------------------
// In-memory repository for tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_repo() -> SqliteWheelRepository {
        // one connection: every connection to sqlite::memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        SqliteWheelRepository::new(pool)
    }

    fn key() -> ChannelKey {
        ChannelKey::new(Some("42"), "wheel-lunch").unwrap()
    }

    #[tokio::test]
    async fn missing_record_loads_as_none() {
        let repo = test_repo().await;
        assert!(repo.load(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trip_keeps_order_duplicates_and_empty_strings() {
        let repo = test_repo().await;
        let options = vec!["b".to_string(), String::new(), "a".to_string(), "b".to_string()];

        let version = repo.save(&key(), &options, None).await.unwrap();
        assert_eq!(version, 1);

        let record = repo.load(&key()).await.unwrap().unwrap();
        assert_eq!(record.options, options);
        assert_eq!(record.version, 1);
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let repo = test_repo().await;
        repo.save(&key(), &["a".to_string()], None).await.unwrap();
        let version = repo.save(&key(), &["a".to_string(), "b".to_string()], Some(1)).await.unwrap();
        assert_eq!(version, 2);
        assert_eq!(repo.load(&key()).await.unwrap().unwrap().options, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let repo = test_repo().await;
        repo.save(&key(), &["a".to_string()], None).await.unwrap();
        repo.save(&key(), &["b".to_string()], Some(1)).await.unwrap();

        let err = repo.save(&key(), &["c".to_string()], Some(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.load(&key()).await.unwrap().unwrap().options, vec!["b"]);
    }

    #[tokio::test]
    async fn second_insert_is_a_conflict() {
        let repo = test_repo().await;
        repo.save(&key(), &["a".to_string()], None).await.unwrap();
        let err = repo.save(&key(), &["z".to_string()], None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn null_options_json_loads_as_empty_wheel() {
        let repo = test_repo().await;
        sqlx::query(
            "INSERT INTO wheels (partition_key, row_key, options_json, timestamp, version) VALUES (?, ?, 'null', 0, 3)",
        )
        .bind(WHEEL_PARTITION_KEY)
        .bind(key().as_str())
        .execute(repo.pool())
        .await
        .unwrap();

        let record = repo.load(&key()).await.unwrap().unwrap();
        assert!(record.options.is_empty());
        assert_eq!(record.version, 3);
    }

    #[tokio::test]
    async fn closed_pool_reports_storage_unavailable() {
        let repo = test_repo().await;
        repo.pool().close().await;
        let err = repo.load(&key()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }
}
