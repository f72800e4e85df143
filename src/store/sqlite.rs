use super::{LinkStore, StoreError};
use crate::models::Link;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;

const LINK_COLUMNS: &str =
    "short_code, original_url, owner_id, clicks, last_clicked_at, created_at";

/// SQLite-backed store. Uniqueness comes from the `UNIQUE` constraint on
/// `links.short_code`.
#[derive(Clone, Debug)]
pub struct SqliteLinkStore {
    pool: SqlitePool,
}

impl SqliteLinkStore {
    /// Open (creating if missing) the database at `database_url` and apply the
    /// embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations on it first.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests.
    ///
    /// One connection that is never recycled, since every SQLite `:memory:`
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }
}

fn map_insert_error(err: sqlx::Error, code: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateKey(code.to_owned())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let link: Option<Link> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn find_by_code_and_owner(
        &self,
        code: &str,
        owner_id: &str,
    ) -> Result<Option<Link>, StoreError> {
        let link: Option<Link> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = ?1 AND owner_id = ?2"
        ))
        .bind(code)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError> {
        let links: Vec<Link> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn list_all(&self) -> Result<Vec<Link>, StoreError> {
        let links: Vec<Link> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn insert(&self, link: Link) -> Result<Link, StoreError> {
        sqlx::query(
            "INSERT INTO links (short_code, original_url, owner_id, clicks, last_clicked_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&link.short_code)
        .bind(&link.original_url)
        .bind(&link.owner_id)
        .bind(link.clicks)
        .bind(link.last_clicked_at)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &link.short_code))?;

        Ok(link)
    }

    async fn increment_clicks(&self, code: &str) -> Result<Option<Link>, StoreError> {
        let link: Option<Link> = sqlx::query_as(&format!(
            "UPDATE links
             SET clicks = clicks + 1,
                 last_clicked_at = MAX(COALESCE(last_clicked_at, ''), ?2)
             WHERE short_code = ?1
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(code)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn delete_by_code_and_owner(
        &self,
        code: &str,
        owner_id: &str,
    ) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM links WHERE short_code = ?1 AND owner_id = ?2")
            .bind(code)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM links WHERE short_code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
