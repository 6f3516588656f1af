use async_trait::async_trait;
use scout_core::{SearchResult, SourceKind};

use crate::browser::{BrowserHandle, PageSession};

pub mod social;
pub mod web;

pub use social::SocialScraper;
pub use web::WebScraper;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Source tag put on every result
    fn source(&self) -> SourceKind;

    /// Scrape results for `query` using the shared `page`. Failures are logged
    /// and whatever was collected is returned.
    async fn scrape(
        &self,
        browser: &dyn BrowserHandle,
        page: &dyn PageSession,
        query: &str,
    ) -> Vec<SearchResult>;
}
