use async_trait::async_trait;
use jiff::Timestamp;
use shortlink_core::repository::{ReadRepository, Repository, Result};
use shortlink_core::{DeletePolicy, ShortCode, ShortLink, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/sqlite/short_links.sql");

// primary result codes; extended codes keep them in the low byte
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Connection settings for [`SqliteRepository::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SqliteSettings {
    /// Database file, created if missing.
    #[builder(setter(into))]
    pub path: PathBuf,
    #[builder(default = 5)]
    pub max_connections: u32,
    /// How long a connection waits on a locked database before giving up.
    #[builder(default = Duration::from_secs(5))]
    pub busy_timeout: Duration,
    #[builder(default)]
    pub delete_policy: DeletePolicy,
}

/// SQLite implementation of the repository contract.
///
/// Uniqueness is enforced by the `short_links` primary key alone: an insert is
/// a single `INSERT` statement and a primary-key violation is reported as
/// [`StorageError::Conflict`]. Reads only return live records
/// (`deleted_at IS NULL`).
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    delete_policy: DeletePolicy,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    ///
    /// The schema is expected to exist; see [`SqliteRepository::init_schema`].
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Sets how deleted codes are handled.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Opens (or creates) the database file and bootstraps the schema.
    pub async fn connect(settings: SqliteSettings) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&settings.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(settings.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool).with_delete_policy(settings.delete_policy);
        repository.init_schema().await?;

        debug!(path = %settings.path.display(), "opened sqlite repository");
        Ok(repository)
    }

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn parse_created_at(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", millis))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn is_busy(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    if is_busy(&err) {
        return StorageError::Timeout(message);
    }

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT target_url, created_at
            FROM short_links
            WHERE code = ?
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
        let created_at_raw: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        Ok(Some(ShortLink {
            code: code.clone(),
            target_url,
            created_at: parse_created_at(created_at_raw)?,
        }))
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert(&self, link: &ShortLink) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (code, target_url, created_at, deleted_at)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(link.code.as_str())
        .bind(link.target_url.as_str())
        .bind(link.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let result = match self.delete_policy {
            DeletePolicy::Tombstone => {
                sqlx::query(
                    r#"
                    UPDATE short_links
                    SET deleted_at = ?
                    WHERE code = ?
                      AND deleted_at IS NULL
                    "#,
                )
                .bind(Timestamp::now().as_millisecond())
                .bind(code.as_str())
                .execute(&self.pool)
                .await
            }
            DeletePolicy::Release => {
                sqlx::query(
                    r#"
                    DELETE FROM short_links
                    WHERE code = ?
                      AND deleted_at IS NULL
                    "#,
                )
                .bind(code.as_str())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
