use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use scout_core::{ArticleBatch, ArticleStorage, Result, SearchResult};
use tracing::{info, warn};

use crate::browser::{BrowserHandle, BrowserLauncher};
use crate::config::ScraperConfig;
use crate::inflight::InFlightSearches;
use crate::scrapers::{Scraper, SocialScraper, WebScraper};

/// What happened to the results of a search when they were stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(String),
    /// A batch with this id was already stored today
    Skipped(String),
    Empty,
}

/// Runs every scraper for a query on one browser and stores the merged results
pub struct SearchManager {
    launcher: Arc<dyn BrowserLauncher>,
    storage: Arc<dyn ArticleStorage>,
    scrapers: Vec<Box<dyn Scraper>>,
    in_flight: InFlightSearches,
}

impl fmt::Debug for SearchManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchManager")
            .field(
                "scrapers",
                &self.scrapers.iter().map(|s| s.source()).collect::<Vec<_>>(),
            )
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl SearchManager {
    /// Web results first, then social posts
    pub fn new(launcher: Arc<dyn BrowserLauncher>, storage: Arc<dyn ArticleStorage>, config: ScraperConfig) -> Self {
        let scrapers: Vec<Box<dyn Scraper>> = vec![
            Box::new(WebScraper::new(config.clone())),
            Box::new(SocialScraper::new(config)),
        ];
        Self::with_scrapers(launcher, storage, scrapers)
    }

    pub fn with_scrapers(
        launcher: Arc<dyn BrowserLauncher>,
        storage: Arc<dyn ArticleStorage>,
        scrapers: Vec<Box<dyn Scraper>>,
    ) -> Self {
        Self {
            launcher,
            storage,
            scrapers,
            in_flight: InFlightSearches::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightSearches {
        &self.in_flight
    }

    /// Scrape every source for `query`, store the results as today's batch
    /// and return them. Fails fast if the same query is already running.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let _guard = self.in_flight.begin(query)?;
        info!("🔍 Searching for \"{}\"", query);

        let results = self.scrape_all(query).await?;
        self.persist(query, &results).await?;
        Ok(results)
    }

    async fn scrape_all(&self, query: &str) -> Result<Vec<SearchResult>> {
        let browser = self.launcher.launch().await?;
        info!("🚀 Browser launched");

        let results = self.run_scrapers(browser.as_ref(), query).await;
        if let Err(e) = browser.close().await {
            warn!("⚠️ Failed to close browser: {}", e);
        }
        results
    }

    async fn run_scrapers(&self, browser: &dyn BrowserHandle, query: &str) -> Result<Vec<SearchResult>> {
        let page = browser.new_page().await?;

        let mut results = Vec::new();
        for scraper in &self.scrapers {
            let found = scraper.scrape(browser, page.as_ref(), query).await;
            info!("📰 {} {} results", found.len(), scraper.source());
            results.extend(found);
        }

        if let Err(e) = page.close().await {
            warn!("⚠️ Failed to close page: {}", e);
        }
        Ok(results)
    }

    /// Store `results` as the batch for `query` today. Nothing is written
    /// when there are no results or the batch already exists.
    pub async fn persist(&self, query: &str, results: &[SearchResult]) -> Result<PersistOutcome> {
        if results.is_empty() {
            info!("📭 No results for \"{}\", nothing to save", query);
            return Ok(PersistOutcome::Empty);
        }

        let batch = ArticleBatch::new(query, results.to_vec(), Utc::now());
        if self.storage.insert_batch_if_absent(&batch).await? {
            info!("💾 Saved {} articles as {}", batch.article_count, batch.id);
            Ok(PersistOutcome::Saved(batch.id))
        } else {
            info!("⏭️ Batch {} already exists, skipping", batch.id);
            Ok(PersistOutcome::Skipped(batch.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeWeb;
    use crate::content::FETCH_FAILED;
    use scout_core::{batch_id, Error, SourceKind};
    use scout_storage::MemoryStorage;
    use std::time::Duration;

    const QUERY: &str = "bitcoin price today";

    fn bitcoin_web(config: &ScraperConfig) -> FakeWeb {
        let web = WebScraper::new(config.clone());
        let social = SocialScraper::new(config.clone());

        FakeWeb::new()
            .with_page(
                web.page_url(QUERY, 0).unwrap().as_str(),
                r#"<html><body>
                    <a href="https://news.example/btc"><h3>Bitcoin today</h3></a>
                    <a href="https://slow.example/btc"><h3>Markets</h3></a>
                </body></html>"#,
            )
            .with_page(
                "https://news.example/btc",
                "<html><body><article><p>Price is $50k</p></article></body></html>",
            )
            .with_timeout("https://slow.example/btc")
            .with_page(
                social.search_url(QUERY).unwrap().as_str(),
                r#"<html><body><article data-testid="tweet">
                    <div data-testid="User-Name">satoshi</div>
                    <div data-testid="tweetText">hodl</div>
                    <a href="https://twitter.com/satoshi/status/1">now</a>
                </article></body></html>"#,
            )
    }

    fn manager(web: &FakeWeb, storage: &MemoryStorage) -> SearchManager {
        SearchManager::new(Arc::new(web.clone()), Arc::new(storage.clone()), ScraperConfig::default())
    }

    #[tokio::test]
    async fn test_search_end_to_end() {
        let web = bitcoin_web(&ScraperConfig::default());
        let storage = MemoryStorage::new();
        let manager = manager(&web, &storage);

        let results = manager.search(QUERY).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "Price is $50k");
        assert_eq!(results[1].content, FETCH_FAILED);
        assert_eq!(results[1].source, SourceKind::Web);
        assert_eq!(results[2].source, SourceKind::Social);
        assert_eq!(results[2].title, "Post by satoshi");
        assert_eq!(results[2].link, "https://x.com/satoshi/status/1");

        let id = batch_id(QUERY, Utc::now().date_naive());
        assert!(id.starts_with("bitcoin-price-today-"));
        let stored = storage.get_batch(&id).await.unwrap().unwrap();
        assert_eq!(stored.article_count, 3);
        assert_eq!(stored.search_query, QUERY);

        // one browser, one shared page, everything closed
        assert_eq!(web.launches(), 1);
        assert_eq!(web.browsers_closed(), 1);
        assert_eq!(web.pages(), (1, 1));
        let (opened, closed) = web.isolated_pages();
        assert_eq!(opened, closed);
        assert!(!manager.in_flight().is_active(QUERY));
    }

    #[tokio::test]
    async fn test_same_day_batch_is_skipped() {
        let web = bitcoin_web(&ScraperConfig::default());
        let storage = MemoryStorage::new();
        let manager = manager(&web, &storage);

        manager.search(QUERY).await.unwrap();
        let results = manager.search(QUERY).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(storage.list_batches().await.unwrap().len(), 1);

        let outcome = manager.persist(QUERY, &results).await.unwrap();
        assert_eq!(
            outcome,
            PersistOutcome::Skipped(batch_id(QUERY, Utc::now().date_naive()))
        );
    }

    #[tokio::test]
    async fn test_no_results_are_not_stored() {
        let web = FakeWeb::new();
        let storage = MemoryStorage::new();
        let manager = manager(&web, &storage);

        assert!(manager.search("nothing here").await.unwrap().is_empty());
        assert!(storage.list_batches().await.unwrap().is_empty());
        assert_eq!(web.browsers_closed(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_releases_query() {
        let web = FakeWeb::new().with_launch_failure();
        let storage = MemoryStorage::new();
        let manager = manager(&web, &storage);

        assert!(matches!(manager.search(QUERY).await, Err(Error::Browser(_))));
        assert!(!manager.in_flight().is_active(QUERY));
    }

    #[tokio::test]
    async fn test_concurrent_same_query_is_rejected() {
        let web = bitcoin_web(&ScraperConfig::default()).with_launch_delay(Duration::from_millis(100));
        let storage = MemoryStorage::new();
        let manager = manager(&web, &storage);

        let (first, second) = tokio::join!(manager.search(QUERY), manager.search("  Bitcoin Price Today"));
        assert_eq!(first.unwrap().len(), 3);
        assert!(matches!(second, Err(Error::SearchInProgress(_))));
        assert_eq!(web.launches(), 1);
    }
}
