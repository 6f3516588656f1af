use std::time::Duration;

use async_trait::async_trait;
use scout_core::Result;

pub mod chrome;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use chrome::ChromeLauncher;

/// How long a navigation waits before the page counts as loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWait {
    DomContentLoaded,
    /// Load event plus a short settle period for late requests
    NetworkIdle,
}

/// A single tab. Every method is bounded by the timeout it is given or by the
/// browser's own defaults.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn goto(&self, url: &str, wait: LoadWait, timeout: Duration) -> Result<()>;

    /// Poll until `selector` matches at least one element
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Serialized DOM of the current document
    async fn html(&self) -> Result<String>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn PageSession>>;

    /// Opens a page in a fresh incognito context that is disposed together
    /// with the page. Requests matching `blocked_urls` are dropped.
    async fn new_isolated_page(&self, blocked_urls: &[String]) -> Result<Box<dyn PageSession>>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>>;
}
