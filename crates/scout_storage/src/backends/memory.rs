use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scout_core::{ArticleBatch, ArticleStorage, Result, Stored, TitledArticle, UnifiedSummary, UserInput};
use tokio::sync::RwLock;

use crate::{new_document_id, StorageBackend};

#[derive(Default)]
struct MemoryStore {
    batches: HashMap<String, ArticleBatch>,
    summaries: Vec<Stored<UnifiedSummary>>,
    titled_articles: Vec<Stored<TitledArticle>>,
    user_inputs: Vec<Stored<UserInput>>,
}

/// Process-local store. Everything is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn summaries(&self) -> Vec<Stored<UnifiedSummary>> {
        self.store.read().await.summaries.clone()
    }

    pub async fn user_inputs(&self) -> Vec<Stored<UserInput>> {
        self.store.read().await.user_inputs.clone()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn insert_batch_if_absent(&self, batch: &ArticleBatch) -> Result<bool> {
        // check and insert happen under the same write lock
        let mut store = self.store.write().await;
        if store.batches.contains_key(&batch.id) {
            return Ok(false);
        }
        store.batches.insert(batch.id.clone(), batch.clone());
        Ok(true)
    }

    async fn get_batch(&self, id: &str) -> Result<Option<ArticleBatch>> {
        Ok(self.store.read().await.batches.get(id).cloned())
    }

    async fn list_batches(&self) -> Result<Vec<ArticleBatch>> {
        let store = self.store.read().await;
        let mut batches: Vec<_> = store.batches.values().cloned().collect();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }

    async fn store_summary(&self, summary: &UnifiedSummary) -> Result<String> {
        let id = new_document_id();
        self.store.write().await.summaries.push(Stored::new(id.clone(), summary.clone()));
        Ok(id)
    }

    async fn store_titled_article(&self, article: &TitledArticle) -> Result<String> {
        let id = new_document_id();
        self.store.write().await.titled_articles.push(Stored::new(id.clone(), article.clone()));
        Ok(id)
    }

    async fn list_titled_articles(&self) -> Result<Vec<Stored<TitledArticle>>> {
        let mut articles = self.store.read().await.titled_articles.clone();
        articles.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(articles)
    }

    async fn get_titled_article(&self, id: &str) -> Result<Option<Stored<TitledArticle>>> {
        Ok(self
            .store
            .read()
            .await
            .titled_articles
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn store_user_input(&self, input: &UserInput) -> Result<String> {
        let id = new_document_id();
        self.store.write().await.user_inputs.push(Stored::new(id.clone(), input.clone()));
        Ok(id)
    }
}
