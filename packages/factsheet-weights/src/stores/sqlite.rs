//! SQLite storage implementation.
//!
//! A file-based storage backend using SQLite. Good for:
//! - Local development
//! - Single-server deployments
//! - Testing with persistent data

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{CacheStore, FetchLog};
use crate::types::cache::{CacheEntry, FetchLogEntry};

/// SQLite-based cache and attempt log.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./weights.db?mode=rwc` - File-based, created if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Each pooled connection would otherwise see its own empty database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS isin_cache (
                isin TEXT PRIMARY KEY,
                source_pdf_url TEXT NOT NULL,
                as_of_date TEXT,
                weights_json TEXT NOT NULL DEFAULT '[]',
                fetched_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                parse_version INTEGER NOT NULL,
                sha256_pdf TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_isin_cache_expires_at ON isin_cache(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fetch_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                isin TEXT NOT NULL,
                attempt_at TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                http_status INTEGER,
                source_url TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_fetch_log_isin ON fetch_log(isin);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of logged attempts for an identifier.
    pub async fn log_count(&self, isin: &str) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fetch_log WHERE isin = ?")
            .bind(isin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;
        Ok(count)
    }
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidRow(format!("Invalid date {:?}: {}", raw, e)))
}

// Row types for sqlx queries
#[derive(Debug, FromRow)]
struct CacheRow {
    isin: String,
    source_pdf_url: String,
    as_of_date: Option<String>,
    weights_json: String,
    fetched_at: String,
    expires_at: String,
    parse_version: i64,
    sha256_pdf: Option<String>,
}

impl CacheRow {
    fn into_entry(self) -> StoreResult<CacheEntry> {
        Ok(CacheEntry {
            fetched_at: parse_timestamp(&self.fetched_at)?,
            expires_at: parse_timestamp(&self.expires_at)?,
            parse_version: i32::try_from(self.parse_version)
                .map_err(|e| StoreError::InvalidRow(format!("parse_version: {}", e)))?,
            isin: self.isin,
            source_pdf_url: self.source_pdf_url,
            as_of_date: self.as_of_date,
            weights_json: self.weights_json,
            sha256_pdf: self.sha256_pdf,
        })
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get_entry(&self, isin: &str) -> StoreResult<Option<CacheEntry>> {
        let row: Option<CacheRow> = sqlx::query_as(
            r#"
            SELECT isin, source_pdf_url, as_of_date, weights_json, fetched_at, expires_at, parse_version, sha256_pdf
            FROM isin_cache WHERE isin = ?
            "#,
        )
        .bind(isin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        row.map(|r| r.into_entry()).transpose()
    }

    async fn upsert_entry(&self, entry: &CacheEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO isin_cache (isin, source_pdf_url, as_of_date, weights_json, fetched_at, expires_at, parse_version, sha256_pdf)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(isin) DO UPDATE SET
                source_pdf_url = excluded.source_pdf_url,
                as_of_date = excluded.as_of_date,
                weights_json = excluded.weights_json,
                fetched_at = excluded.fetched_at,
                expires_at = excluded.expires_at,
                parse_version = excluded.parse_version,
                sha256_pdf = excluded.sha256_pdf
            "#,
        )
        .bind(&entry.isin)
        .bind(&entry.source_pdf_url)
        .bind(&entry.as_of_date)
        .bind(&entry.weights_json)
        .bind(entry.fetched_at.to_rfc3339())
        .bind(entry.expires_at.to_rfc3339())
        .bind(i64::from(entry.parse_version))
        .bind(&entry.sha256_pdf)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(Box::new(e)))?;
        Ok(())
    }
}

#[async_trait]
impl FetchLog for SqliteStore {
    async fn append(&self, entry: &FetchLogEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fetch_log (isin, attempt_at, status, message, http_status, source_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.isin)
        .bind(entry.attempt_at.to_rfc3339())
        .bind(entry.status.as_str())
        .bind(&entry.message)
        .bind(entry.http_status.map(i64::from))
        .bind(&entry.source_url)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(Box::new(e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constituent::ConstituentWeight;
    use chrono::Duration;

    async fn test_store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_entry_storage() {
        let store = test_store().await;
        let now = Utc::now();
        let entry = CacheEntry::success(
            "CH0454664001",
            "https://cdn.21shares.com/uploads/Factsheet_ABTC.pdf",
            &[ConstituentWeight::whole("BTC")],
            now,
            Duration::hours(24),
            1,
        )
        .unwrap()
        .with_as_of_date(Some("15/01/2025".to_string()))
        .with_sha256("deadbeef");

        store.upsert_entry(&entry).await.unwrap();

        let retrieved = store.get_entry("CH0454664001").await.unwrap().unwrap();
        assert_eq!(retrieved.source_pdf_url, entry.source_pdf_url);
        assert_eq!(retrieved.as_of_date.as_deref(), Some("15/01/2025"));
        assert_eq!(retrieved.sha256_pdf.as_deref(), Some("deadbeef"));
        assert_eq!(retrieved.constituents().unwrap(), vec![ConstituentWeight::whole("BTC")]);
        assert_eq!(retrieved.expires_at.timestamp(), entry.expires_at.timestamp());
        assert!(store.get_entry("XS0000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_every_column() {
        let store = test_store().await;
        let now = Utc::now();
        let first = CacheEntry::success(
            "CH0454664001",
            "https://cdn.21shares.com/a.pdf",
            &[ConstituentWeight::whole("BTC")],
            now,
            Duration::hours(24),
            1,
        )
        .unwrap()
        .with_sha256("first");
        let second = CacheEntry::failure("CH0454664001", "https://cdn.21shares.com/b.pdf", now, Duration::minutes(30), 2);

        store.upsert_entry(&first).await.unwrap();
        store.upsert_entry(&second).await.unwrap();

        let retrieved = store.get_entry("CH0454664001").await.unwrap().unwrap();
        assert_eq!(retrieved.source_pdf_url, "https://cdn.21shares.com/b.pdf");
        assert_eq!(retrieved.weights_json, "[]");
        assert_eq!(retrieved.parse_version, 2);
        assert_eq!(retrieved.sha256_pdf, None);
    }

    #[tokio::test]
    async fn test_log_append_and_ping() {
        let store = test_store().await;
        let now = Utc::now();

        store
            .append(
                &FetchLogEntry::error("CH0454664001", now, "HTTP 404")
                    .with_http_status(Some(404))
                    .with_source_url("https://cdn.21shares.com/a.pdf"),
            )
            .await
            .unwrap();
        store.append(&FetchLogEntry::success("CH0454664001", now)).await.unwrap();

        assert_eq!(store.log_count("CH0454664001").await.unwrap(), 2);
        assert_eq!(store.log_count("XS0000000000").await.unwrap(), 0);
        store.ping().await.unwrap();
    }
}
