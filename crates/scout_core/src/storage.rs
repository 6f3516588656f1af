use async_trait::async_trait;
use crate::types::{ArticleBatch, Stored, TitledArticle, UnifiedSummary, UserInput};
use crate::Result;

/// Document store with one namespace per record kind. Listings are newest first.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Store `batch` unless a batch with the same id exists.
    /// Returns `false` when the write was skipped.
    async fn insert_batch_if_absent(&self, batch: &ArticleBatch) -> Result<bool>;

    async fn get_batch(&self, id: &str) -> Result<Option<ArticleBatch>>;

    async fn list_batches(&self) -> Result<Vec<ArticleBatch>>;

    /// Store a summary and return its generated id
    async fn store_summary(&self, summary: &UnifiedSummary) -> Result<String>;

    /// Store a titled article and return its generated id
    async fn store_titled_article(&self, article: &TitledArticle) -> Result<String>;

    async fn list_titled_articles(&self) -> Result<Vec<Stored<TitledArticle>>>;

    async fn get_titled_article(&self, id: &str) -> Result<Option<Stored<TitledArticle>>>;

    /// Store a contact form submission and return its generated id
    async fn store_user_input(&self, input: &UserInput) -> Result<String>;
}
