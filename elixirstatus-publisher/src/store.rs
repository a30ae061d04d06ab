//! SQLite persistence for short links and the posting fields the publisher writes back.
//!
//! The schema is created idempotently by [`SqliteStore::migrate`]. Timestamps are
//! RFC 3339 strings in UTC.
use async_trait::async_trait;
use chrono::Utc;
use elixirstatus_common::{Result, StatusError};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use crate::posting::Posting;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS short_links (
         uid        TEXT PRIMARY KEY,
         url        TEXT NOT NULL UNIQUE,
         created_at TEXT NOT NULL
       )"#,
    r#"CREATE TABLE IF NOT EXISTS postings (
         uid                 TEXT PRIMARY KEY,
         title               TEXT,
         text                TEXT NOT NULL DEFAULT '',
         permalink           TEXT,
         published_tweet_uid TEXT,
         created_at          TEXT NOT NULL,
         updated_at          TEXT NOT NULL
       )"#,
];

fn storage_err(e: sqlx::Error) -> StatusError {
    StatusError::Storage(e.to_string())
}

/// Lookup and insertion of short link rows.
#[async_trait]
pub trait ShortLinkRepo: Send + Sync {
    async fn uid_for_url(&self, url: &str) -> Result<Option<String>>;
    async fn url_for_uid(&self, uid: &str) -> Result<Option<String>>;
    /// Returns `false` when the uid or the url already exists.
    async fn insert_short_link(&self, uid: &str, url: &str) -> Result<bool>;
}

/// The slice of posting persistence the publisher needs.
#[async_trait]
pub trait PostingRepo: Send + Sync {
    async fn get_posting(&self, uid: &str) -> Result<Option<Posting>>;
    async fn save_posting(&self, posting: &Posting) -> Result<()>;
    async fn set_published_tweet_uid(&self, posting_uid: &str, tweet_uid: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://elixirstatus.db?mode=rwc`) and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 4 });
        if in_memory {
            // Every new connection would see a fresh, empty database.
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(url).await.map_err(storage_err)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;
        }
        debug!(tables = SCHEMA.len(), "store.migrate");
        Ok(())
    }

    /// Every short link, oldest first.
    pub async fn list_short_links(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT uid, url FROM short_links ORDER BY created_at ASC, uid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.into_iter()
            .map(|r| {
                let uid = r.try_get::<String, _>("uid").map_err(storage_err)?;
                let url = r.try_get::<String, _>("url").map_err(storage_err)?;
                Ok((uid, url))
            })
            .collect()
    }
}

#[async_trait]
impl ShortLinkRepo for SqliteStore {
    async fn uid_for_url(&self, url: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT uid FROM short_links WHERE url = ?1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        row.map(|r| r.try_get::<String, _>("uid"))
            .transpose()
            .map_err(storage_err)
    }

    async fn url_for_uid(&self, uid: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT url FROM short_links WHERE uid = ?1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        row.map(|r| r.try_get::<String, _>("url"))
            .transpose()
            .map_err(storage_err)
    }

    async fn insert_short_link(&self, uid: &str, url: &str) -> Result<bool> {
        let res = sqlx::query(
            r#"INSERT INTO short_links (uid, url, created_at)
               VALUES (?1, ?2, ?3)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(uid)
        .bind(url)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        let inserted = res.rows_affected() == 1;
        debug!(uid, url, inserted, "store.insert_short_link");
        Ok(inserted)
    }
}

#[async_trait]
impl PostingRepo for SqliteStore {
    async fn get_posting(&self, uid: &str) -> Result<Option<Posting>> {
        let row = sqlx::query(
            r#"SELECT uid, title, text, permalink, published_tweet_uid
               FROM postings WHERE uid = ?1"#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        let Some(r) = row else {
            return Ok(None);
        };
        Ok(Some(Posting {
            uid: r.try_get("uid").map_err(storage_err)?,
            title: r.try_get("title").map_err(storage_err)?,
            text: r.try_get("text").map_err(storage_err)?,
            permalink: r.try_get("permalink").map_err(storage_err)?,
            published_tweet_uid: r.try_get("published_tweet_uid").map_err(storage_err)?,
        }))
    }

    async fn save_posting(&self, posting: &Posting) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let res = sqlx::query(
            r#"INSERT INTO postings
               (uid, title, text, permalink, published_tweet_uid, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
               ON CONFLICT(uid) DO UPDATE SET
                 title=excluded.title,
                 text=excluded.text,
                 permalink=excluded.permalink,
                 published_tweet_uid=COALESCE(excluded.published_tweet_uid, postings.published_tweet_uid),
                 updated_at=excluded.updated_at"#,
        )
        .bind(&posting.uid)
        .bind(&posting.title)
        .bind(&posting.text)
        .bind(&posting.permalink)
        .bind(&posting.published_tweet_uid)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        info!(
            posting_uid=%posting.uid,
            rows=res.rows_affected(),
            "store.save_posting"
        );
        Ok(())
    }

    async fn set_published_tweet_uid(&self, posting_uid: &str, tweet_uid: &str) -> Result<()> {
        let res = sqlx::query(
            r#"UPDATE postings
               SET published_tweet_uid = ?1, updated_at = ?2
               WHERE uid = ?3"#,
        )
        .bind(tweet_uid)
        .bind(Utc::now().to_rfc3339())
        .bind(posting_uid)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if res.rows_affected() == 0 {
            warn!(posting_uid, tweet_uid, "store.set_published_tweet_uid.missing");
            return Err(StatusError::NotFound(format!("posting {posting_uid}")));
        }
        info!(posting_uid, tweet_uid, "store.set_published_tweet_uid");
        Ok(())
    }
}
