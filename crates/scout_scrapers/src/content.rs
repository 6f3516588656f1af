use std::time::Duration;

use scout_core::Result;

use crate::browser::{BrowserHandle, LoadWait, PageSession};
use crate::config::ScraperConfig;
use crate::extract::main_text;
use crate::logging::Logger;

/// Returned in place of content when a page could not be loaded or read
pub const FETCH_FAILED: &str = "Error fetching article content";

/// Returned when a page loaded but had no visible text
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable";

/// Loads one URL in its own incognito context and returns its main text
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    timeout: Duration,
    blocked_urls: Vec<String>,
}

impl ContentFetcher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            blocked_urls: config.blocked_url_patterns.clone(),
        }
    }

    /// Never fails; errors become [`FETCH_FAILED`].
    pub async fn fetch(&self, browser: &dyn BrowserHandle, url: &str) -> String {
        let logger = Logger::new().with_prefix("[content]");

        let page = match browser.new_isolated_page(&self.blocked_urls).await {
            Ok(page) => page,
            Err(e) => {
                logger.warn(&format!("⚠️ Could not open a context for {}: {}", url, e));
                return FETCH_FAILED.to_string();
            }
        };

        let extracted = self.extract(page.as_ref(), url).await;
        if let Err(e) = page.close().await {
            logger.warn(&format!("⚠️ Failed to close context for {}: {}", url, e));
        }

        match extracted {
            Ok(text) if text.is_empty() => CONTENT_UNAVAILABLE.to_string(),
            Ok(text) => {
                logger.debug(&format!("📄 {} chars from {}", text.chars().count(), url));
                text
            }
            Err(e) => {
                logger.warn(&format!("❌ Error fetching content from {}: {}", url, e));
                FETCH_FAILED.to_string()
            }
        }
    }

    async fn extract(&self, page: &dyn PageSession, url: &str) -> Result<String> {
        page.goto(url, LoadWait::NetworkIdle, self.timeout).await?;
        let html = page.html().await?;
        Ok(main_text(&html))
    }
}
