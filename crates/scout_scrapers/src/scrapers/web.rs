use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scout_core::{Error, Result, SearchResult, SourceKind};
use url::Url;

use super::Scraper;
use crate::browser::{BrowserHandle, LoadWait, PageSession};
use crate::config::ScraperConfig;
use crate::content::ContentFetcher;
use crate::extract::{result_links, ResultLink};
use crate::logging::Logger;

/// Walks a fixed number of search result pages and fetches every linked page
#[derive(Debug, Clone)]
pub struct WebScraper {
    config: ScraperConfig,
    fetcher: ContentFetcher,
}

impl WebScraper {
    pub fn new(config: ScraperConfig) -> Self {
        let fetcher = ContentFetcher::new(&config);
        Self { config, fetcher }
    }

    /// `<base>?q=<query>&start=<page * results_per_page>`
    pub fn page_url(&self, query: &str, page: usize) -> Result<Url> {
        let start = (page * self.config.results_per_page).to_string();
        Url::parse_with_params(&self.config.web_search_url, &[("q", query), ("start", start.as_str())])
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.config.web_search_url, e)))
    }

    async fn scrape_page(
        &self,
        browser: &dyn BrowserHandle,
        page: &dyn PageSession,
        url: &Url,
        logger: &Logger,
    ) -> Result<Vec<SearchResult>> {
        page.goto(url.as_str(), LoadWait::DomContentLoaded, self.config.search_timeout())
            .await?;
        let html = page.html().await?;
        let links = result_links(&html, url);
        logger.info(&format!("🔗 Found {} results", links.len()));

        let fetcher = &self.fetcher;
        let results = stream::iter(links)
            .map(|link: ResultLink| async move {
                let content = fetcher.fetch(browser, &link.link).await;
                SearchResult {
                    title: link.title,
                    link: link.link,
                    content,
                    source: SourceKind::Web,
                }
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;
        Ok(results)
    }
}

#[async_trait]
impl Scraper for WebScraper {
    fn source(&self) -> SourceKind {
        SourceKind::Web
    }

    async fn scrape(
        &self,
        browser: &dyn BrowserHandle,
        page: &dyn PageSession,
        query: &str,
    ) -> Vec<SearchResult> {
        let pages = self.config.result_pages;
        let mut results = Vec::new();

        for index in 0..pages {
            let logger = Logger::new()
                .with_prefix("[web]")
                .with_prefix(format!("[page {}/{}]", index + 1, pages));

            let url = match self.page_url(query, index) {
                Ok(url) => url,
                Err(e) => {
                    logger.error(&format!("❌ {}", e));
                    break;
                }
            };

            logger.info(&format!("🌐 Loading {}", url));
            match self.scrape_page(browser, page, &url, &logger).await {
                Ok(page_results) => results.extend(page_results),
                Err(e) => logger.warn(&format!("⚠️ Skipping page: {}", e)),
            }
        }

        Logger::new()
            .with_prefix("[web]")
            .info(&format!("✨ {} results for \"{}\"", results.len(), query));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeWeb;
    use crate::browser::BrowserLauncher;
    use crate::content::FETCH_FAILED;

    fn config(pages: usize) -> ScraperConfig {
        ScraperConfig {
            result_pages: pages,
            ..Default::default()
        }
    }

    fn results_page(links: &[(&str, &str)]) -> String {
        let items: String = links
            .iter()
            .map(|(href, title)| format!(r#"<div class="g"><a href="{}"><h3>{}</h3></a></div>"#, href, title))
            .collect();
        format!("<html><body>{}</body></html>", items)
    }

    #[test]
    fn test_page_url() {
        let scraper = WebScraper::new(config(5));
        assert_eq!(
            scraper.page_url("bitcoin price today", 0).unwrap().as_str(),
            "https://www.google.com/search?q=bitcoin+price+today&start=0"
        );
        assert_eq!(
            scraper.page_url("a&b", 2).unwrap().as_str(),
            "https://www.google.com/search?q=a%26b&start=20"
        );
    }

    #[tokio::test]
    async fn test_failed_pages_are_skipped() {
        let scraper = WebScraper::new(config(3));
        let first = scraper.page_url("btc", 0).unwrap();
        let third = scraper.page_url("btc", 2).unwrap();

        let web = FakeWeb::new()
            .with_page(first.as_str(), results_page(&[("https://a.example/", "A")]))
            .with_timeout(scraper.page_url("btc", 1).unwrap().as_str())
            .with_page(third.as_str(), results_page(&[("https://c.example/", "C")]))
            .with_page("https://a.example/", "<article>alpha</article>");

        let browser = web.launch().await.unwrap();
        let page = browser.new_page().await.unwrap();
        let results = scraper.scrape(browser.as_ref(), page.as_ref(), "btc").await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[0].content, "alpha");
        assert_eq!(results[1].title, "C");
        assert_eq!(results[1].content, FETCH_FAILED);
        assert!(results.iter().all(|r| r.source == SourceKind::Web));

        assert_eq!(
            web.navigations(),
            vec![
                first.to_string(),
                "https://a.example/".to_string(),
                scraper.page_url("btc", 1).unwrap().to_string(),
                third.to_string(),
                "https://c.example/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_results_keep_link_order() {
        let scraper = WebScraper::new(ScraperConfig {
            result_pages: 1,
            fetch_concurrency: 2,
            ..Default::default()
        });
        let links: Vec<(String, String)> = (0..7)
            .map(|i| (format!("https://site{}.example/", i), format!("Result {}", i)))
            .collect();
        let borrowed: Vec<(&str, &str)> = links.iter().map(|(l, t)| (l.as_str(), t.as_str())).collect();

        let mut web = FakeWeb::new().with_page(scraper.page_url("q", 0).unwrap().as_str(), results_page(&borrowed));
        for (i, (link, _)) in links.iter().enumerate() {
            web = web.with_page(link.as_str(), format!("<p>body {}</p>", i));
        }

        let browser = web.launch().await.unwrap();
        let page = browser.new_page().await.unwrap();
        let results = scraper.scrape(browser.as_ref(), page.as_ref(), "q").await;

        let contents: Vec<_> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(
            contents,
            ["body 0", "body 1", "body 2", "body 3", "body 4", "body 5", "body 6"]
        );
        assert_eq!(results[3].link, "https://site3.example/");
        assert_eq!(web.isolated_pages(), (7, 7));
    }
}
