use std::sync::Arc;

use scout_core::ArticleStorage;
use scout_inference::{ArticleComposer, Summarizer};
use scout_scrapers::SearchManager;

/// Everything the handlers share
pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    pub search: SearchManager,
    pub summarizer: Summarizer,
    pub composer: ArticleComposer,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        search: SearchManager,
        summarizer: Summarizer,
        composer: ArticleComposer,
    ) -> Self {
        Self {
            storage,
            search,
            summarizer,
            composer,
        }
    }
}
