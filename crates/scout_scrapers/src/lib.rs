pub mod browser;
pub mod cli;
pub mod config;
pub mod content;
pub mod extract;
pub mod inflight;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use browser::{BrowserHandle, BrowserLauncher, ChromeLauncher, LoadWait, PageSession};
pub use cli::{handle_search, ScraperArgs};
pub use config::ScraperConfig;
pub use content::{ContentFetcher, CONTENT_UNAVAILABLE, FETCH_FAILED};
pub use inflight::{InFlightGuard, InFlightSearches};
pub use manager::{PersistOutcome, SearchManager};
pub use scrapers::{Scraper, SocialScraper, WebScraper};

pub mod prelude {
    pub use super::browser::{BrowserHandle, BrowserLauncher, PageSession};
    pub use super::scrapers::Scraper;
    pub use super::{ScraperConfig, SearchManager};
    pub use scout_core::{Error, Result, SearchResult, SourceKind};
}
