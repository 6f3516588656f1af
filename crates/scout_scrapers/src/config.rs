use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser and source settings shared by every scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Run the browser without a window (default: true)
    pub headless: bool,

    /// Web search endpoint; `q` and `start` are appended
    pub web_search_url: String,

    /// Social search endpoint; `q`, `src` and `f` are appended
    pub social_search_url: String,

    /// Result pages visited per web search (default: 5)
    pub result_pages: usize,

    /// Offset step between result pages (default: 10)
    pub results_per_page: usize,

    /// Result page navigation timeout in seconds (default: 120)
    pub search_timeout_secs: u64,

    /// Social feed navigation timeout in seconds (default: 60)
    pub social_timeout_secs: u64,

    /// How long to wait for the first rendered post in seconds (default: 10)
    pub post_wait_secs: u64,

    /// Per-link content navigation timeout in seconds (default: 60)
    pub fetch_timeout_secs: u64,

    /// Extra wait after load for late network activity in milliseconds (default: 500)
    pub settle_ms: u64,

    /// Content fetches running at once (default: 4)
    pub fetch_concurrency: usize,

    /// URL patterns dropped while fetching article content
    pub blocked_url_patterns: Vec<String>,

    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            web_search_url: "https://www.google.com/search".to_string(),
            social_search_url: "https://x.com/search".to_string(),
            result_pages: 5,
            results_per_page: 10,
            search_timeout_secs: 120,
            social_timeout_secs: 60,
            post_wait_secs: 10,
            fetch_timeout_secs: 60,
            settle_ms: 500,
            fetch_concurrency: 4,
            blocked_url_patterns: [
                "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico", "*.mp4", "*.webm",
                "*.mp3", "*.m4a", "*.ogg", "*.woff", "*.woff2",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn social_timeout(&self) -> Duration {
        Duration::from_secs(self.social_timeout_secs)
    }

    pub fn post_wait(&self) -> Duration {
        Duration::from_secs(self.post_wait_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// DevTools command timeout; must not undercut any navigation timeout
    pub fn request_timeout(&self) -> Duration {
        [
            self.search_timeout_secs,
            self.social_timeout_secs,
            self.post_wait_secs,
            self.fetch_timeout_secs,
        ]
        .into_iter()
        .max()
        .map_or(Duration::ZERO, Duration::from_secs)
    }
}
