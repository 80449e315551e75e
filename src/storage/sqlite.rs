use crate::models::{NewVisit, ShortUrl};
use crate::storage::{Storage, StorageError, StorageResult, VisitDimension};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE,
                long_url TEXT NOT NULL,
                title TEXT,
                created_at INTEGER NOT NULL,
                expires_at INTEGER,
                disabled INTEGER NOT NULL DEFAULT 0,
                creator_id TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_urls_creator ON urls(creator_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url_id INTEGER NOT NULL,
                slug TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                ip_address TEXT,
                referrer TEXT,
                user_agent TEXT,
                browser TEXT,
                os TEXT,
                device_type TEXT NOT NULL DEFAULT 'desktop'
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_slug ON visits(slug)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_created_at ON visits(created_at)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create_url(
        &self,
        slug: &str,
        long_url: &str,
        title: Option<&str>,
        expires_at: Option<i64>,
        creator_id: Option<&str>,
    ) -> StorageResult<ShortUrl> {
        let created_at = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO urls (slug, long_url, title, created_at, expires_at, disabled, creator_id)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            ON CONFLICT(slug) DO NOTHING
            "#,
        )
        .bind(slug)
        .bind(long_url)
        .bind(title)
        .bind(created_at)
        .bind(expires_at)
        .bind(creator_id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        let url = sqlx::query_as::<_, ShortUrl>(
            r#"
            SELECT id, slug, long_url, title, created_at, expires_at, disabled, creator_id
            FROM urls
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(url)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>> {
        let url = sqlx::query_as::<_, ShortUrl>(
            r#"
            SELECT id, slug, long_url, title, created_at, expires_at, disabled, creator_id
            FROM urls
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(url)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE slug = ?")
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count > 0)
    }

    async fn update_url(
        &self,
        slug: &str,
        disabled: Option<bool>,
        expires_at: Option<i64>,
    ) -> Result<bool> {
        if !self.slug_exists(slug).await? {
            return Ok(false);
        }

        if let Some(disabled) = disabled {
            sqlx::query("UPDATE urls SET disabled = ? WHERE slug = ?")
                .bind(disabled)
                .bind(slug)
                .execute(self.pool.as_ref())
                .await?;
        }

        if let Some(expires_at) = expires_at {
            sqlx::query("UPDATE urls SET expires_at = ? WHERE slug = ?")
                .bind(expires_at)
                .bind(slug)
                .execute(self.pool.as_ref())
                .await?;
        }

        Ok(true)
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<ShortUrl>> {
        let urls = sqlx::query_as::<_, ShortUrl>(
            r#"
            SELECT id, slug, long_url, title, created_at, expires_at, disabled, creator_id
            FROM urls
            WHERE creator_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(urls)
    }

    async fn append_visit(&self, visit: &NewVisit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visits
                (url_id, slug, created_at, ip_address, referrer, user_agent, browser, os, device_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(visit.url_id)
        .bind(&visit.slug)
        .bind(visit.created_at)
        .bind(&visit.ip_address)
        .bind(&visit.referrer)
        .bind(&visit.user_agent)
        .bind(&visit.browser)
        .bind(&visit.os)
        .bind(&visit.device_type)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count_visits(&self, slug: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits WHERE slug = ?")
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_unique_visitors(&self, slug: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM (
                SELECT DISTINCT ip_address, user_agent
                FROM visits
                WHERE slug = ?
            ) AS pairs
            "#,
        )
        .bind(slug)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn visits_per_day(&self, slug: &str) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT strftime('%Y-%m-%d', created_at, 'unixepoch') AS day, COUNT(*) AS count
            FROM visits
            WHERE slug = ?
            GROUP BY day
            "#,
        )
        .bind(slug)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn group_visits(
        &self,
        slug: &str,
        dimension: VisitDimension,
    ) -> Result<Vec<(Option<String>, i64)>> {
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM visits WHERE slug = ? GROUP BY {col}",
            col = dimension.column()
        );

        let rows = sqlx::query_as::<_, (Option<String>, i64)>(&sql)
            .bind(slug)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows)
    }
}
