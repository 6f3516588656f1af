use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_core::{
    ArticleBatch, ArticleStorage, Error, Result, SearchResult, Stored, TitledArticle, UnifiedSummary,
    UserInput,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;

use crate::{new_document_id, StorageBackend};

const DEFAULT_DB_PATH: &str = "scout.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS article_batches (
        id TEXT PRIMARY KEY,
        search_query TEXT NOT NULL,
        created_at TEXT NOT NULL,
        article_count INTEGER NOT NULL,
        articles TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS article_summaries (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS titled_articles (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_inputs (
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
];

fn storage_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at ./scout.db"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        let path = url
            .map(|u| u.trim_start_matches("sqlite://").trim_start_matches("sqlite:"))
            .unwrap_or(DEFAULT_DB_PATH);
        let storage = Self::new_with_path(Path::new(path)).await?;
        tracing::info!("🗄️ Opened SQLite database at {}", storage.get_db_path().display());
        Ok(storage)
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn insert_document(&self, table: &str, created_at: DateTime<Utc>, body: String) -> Result<String> {
        let id = new_document_id();
        sqlx::query(&format!(
            "INSERT INTO {} (id, created_at, body) VALUES (?, ?, ?)",
            table
        ))
        .bind(&id)
        .bind(created_at.to_rfc3339())
        .bind(body)
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error(&format!("Failed to insert into {}", table), e))?;
        Ok(id)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date '{}': {}", raw, e)))
}

fn batch_from_row(row: &SqliteRow) -> Result<ArticleBatch> {
    let articles: Vec<SearchResult> = serde_json::from_str(row.get::<&str, _>("articles"))?;
    let article_count: i64 = row.get("article_count");
    Ok(ArticleBatch {
        id: row.get("id"),
        articles,
        search_query: row.get("search_query"),
        created_at: parse_timestamp(row.get::<&str, _>("created_at"))?,
        article_count: article_count as usize,
    })
}

fn titled_from_row(row: &SqliteRow) -> Result<Stored<TitledArticle>> {
    let article: TitledArticle = serde_json::from_str(row.get::<&str, _>("body"))?;
    Ok(Stored::new(row.get::<String, _>("id"), article))
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn insert_batch_if_absent(&self, batch: &ArticleBatch) -> Result<bool> {
        let articles = serde_json::to_string(&batch.articles)?;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO article_batches
            (id, search_query, created_at, article_count, articles)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.search_query)
        .bind(batch.created_at.to_rfc3339())
        .bind(batch.article_count as i64)
        .bind(articles)
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to store batch", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_batch(&self, id: &str) -> Result<Option<ArticleBatch>> {
        let row = sqlx::query("SELECT * FROM article_batches WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to get batch", e))?;
        row.as_ref().map(batch_from_row).transpose()
    }

    async fn list_batches(&self) -> Result<Vec<ArticleBatch>> {
        let rows = sqlx::query("SELECT * FROM article_batches ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to list batches", e))?;
        rows.iter().map(batch_from_row).collect()
    }

    async fn store_summary(&self, summary: &UnifiedSummary) -> Result<String> {
        self.insert_document("article_summaries", summary.created_at, serde_json::to_string(summary)?)
            .await
    }

    async fn store_titled_article(&self, article: &TitledArticle) -> Result<String> {
        self.insert_document("titled_articles", article.created_at, serde_json::to_string(article)?)
            .await
    }

    async fn list_titled_articles(&self) -> Result<Vec<Stored<TitledArticle>>> {
        let rows = sqlx::query("SELECT * FROM titled_articles ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to list articles", e))?;
        rows.iter().map(titled_from_row).collect()
    }

    async fn get_titled_article(&self, id: &str) -> Result<Option<Stored<TitledArticle>>> {
        let row = sqlx::query("SELECT * FROM titled_articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to get article", e))?;
        row.as_ref().map(titled_from_row).transpose()
    }

    async fn store_user_input(&self, input: &UserInput) -> Result<String> {
        self.insert_document("user_inputs", input.timestamp, serde_json::to_string(input)?)
            .await
    }
}
