pub mod models;
pub mod schema;

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{NewNotification, Notification};
use notibox_shared::api::NotificationDto;
use tracing::trace;

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error (query failure, constraint violation, etc.)
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder().max_size(4).build(manager)?;

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                conn.run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(())
            })
            .await??;
        }

        Ok(Store { pool })
    }

    /// Append a batch of records; keys are assigned by the database in
    /// insertion order. Returns the number of rows written.
    pub async fn insert_all(&self, records: &[NotificationDto]) -> Result<usize, StorageError> {
        use schema::notifications;

        if records.is_empty() {
            return Ok(0);
        }
        let pool = self.pool.clone();
        let records_owned = records.to_owned();
        trace!(count = records_owned.len(), "insert_all starting");
        tokio::task::spawn_blocking(move || -> Result<usize, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let now = Utc::now().naive_utc();
            let rows: Vec<NewNotification> = records_owned
                .iter()
                .map(|r| NewNotification {
                    uri: &r.uri,
                    remote_id: &r.id,
                    received_at: now,
                })
                .collect();
            Ok(diesel::insert_into(notifications::table)
                .values(&rows)
                .execute(&mut conn)?)
        })
        .await?
    }

    /// Every record, oldest first.
    pub async fn all(&self) -> Result<Vec<Notification>, StorageError> {
        use schema::notifications::dsl::*;
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<Notification>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            Ok(notifications
                .order(key.asc())
                .load::<Notification>(&mut conn)?)
        })
        .await?
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        use schema::notifications::dsl::*;
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<i64, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            Ok(notifications.count().get_result(&mut conn)?)
        })
        .await?
    }

    /// Remove exactly one record. Returns whether a row was deleted.
    pub async fn delete(&self, record_key: i32) -> Result<bool, StorageError> {
        use schema::notifications::dsl::*;
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<bool, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let deleted =
                diesel::delete(notifications.filter(key.eq(record_key))).execute(&mut conn)?;
            Ok(deleted > 0)
        })
        .await?
    }
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    // Enable WAL for better read/write concurrency and set a busy timeout
    // Ignore the result rows; Diesel's execute is fine for PRAGMAs
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(uri: &str, id: &str) -> NotificationDto {
        NotificationDto {
            uri: uri.to_string(),
            id: id.to_string(),
        }
    }

    async fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::connect_sqlite(&path.to_string_lossy()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn keys_ascend_across_batches() {
        let (_dir, store) = temp_store().await;
        store.insert_all(&[dto("http://a", "1")]).await.unwrap();
        store
            .insert_all(&[dto("http://b", "2"), dto("http://c", "3")])
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 3);
        let keys: Vec<i32> = all.iter().map(|n| n.key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(all[0].uri, "http://a");
        assert_eq!(all[2].remote_id, "3");
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let (_dir, store) = temp_store().await;
        store
            .insert_all(&[dto("http://a", "1"), dto("http://b", "2"), dto("http://c", "3")])
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        let middle = all[1].key;
        assert!(store.delete(middle).await.unwrap());

        let rest = store.all().await.unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].key, all[0].key);
        assert_eq!(rest[1].key, all[2].key);

        // A second delete of the same key is a no-op
        assert!(!store.delete(middle).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn keys_are_not_reused_after_delete() {
        let (_dir, store) = temp_store().await;
        store.insert_all(&[dto("http://a", "1")]).await.unwrap();
        let first = store.all().await.unwrap()[0].key;
        store.delete(first).await.unwrap();
        store.insert_all(&[dto("http://b", "2")]).await.unwrap();
        let second = store.all().await.unwrap()[0].key;
        assert!(second > first);
    }

    #[tokio::test]
    async fn count_matches_all_len() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.count().await.unwrap(), 0);
        store
            .insert_all(&[dto("http://a", "1"), dto("http://b", "2")])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.all().await.unwrap().len(), 2);
    }
}
