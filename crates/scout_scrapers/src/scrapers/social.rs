use async_trait::async_trait;
use scout_core::{Error, Result, SearchResult, SourceKind};
use url::Url;

use super::Scraper;
use crate::browser::{BrowserHandle, LoadWait, PageSession};
use crate::config::ScraperConfig;
use crate::extract::{social_posts, POST_SELECTOR};
use crate::logging::Logger;

/// Reads the live feed of a social search page
#[derive(Debug, Clone)]
pub struct SocialScraper {
    config: ScraperConfig,
}

impl SocialScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    pub fn search_url(&self, query: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.config.social_search_url,
            &[("q", query), ("src", "typed_query"), ("f", "live")],
        )
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.config.social_search_url, e)))
    }

    async fn collect(&self, page: &dyn PageSession, query: &str, logger: &Logger) -> Result<Vec<SearchResult>> {
        let url = self.search_url(query)?;
        logger.info(&format!("🐦 Loading {}", url));

        page.goto(url.as_str(), LoadWait::NetworkIdle, self.config.social_timeout())
            .await?;
        page.wait_for_selector(POST_SELECTOR, self.config.post_wait())
            .await?;

        let html = page.html().await?;
        Ok(social_posts(&html, &url)
            .into_iter()
            .map(|post| SearchResult {
                title: format!("Post by {}", post.author),
                link: post.link,
                content: post.text,
                source: SourceKind::Social,
            })
            .collect())
    }
}

#[async_trait]
impl Scraper for SocialScraper {
    fn source(&self) -> SourceKind {
        SourceKind::Social
    }

    async fn scrape(
        &self,
        _browser: &dyn BrowserHandle,
        page: &dyn PageSession,
        query: &str,
    ) -> Vec<SearchResult> {
        let logger = Logger::new().with_prefix("[social]");
        match self.collect(page, query, &logger).await {
            Ok(results) => {
                logger.info(&format!("✨ {} posts for \"{}\"", results.len(), query));
                results
            }
            Err(e) => {
                logger.error(&format!("❌ Error scraping posts: {}", e));
                Vec::new()
            }
        }
    }
}
