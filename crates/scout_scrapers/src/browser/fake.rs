//! Scripted in-memory browser for tests. Pages are served from a url -> html
//! table and every open/close is counted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use scout_core::{Error, Result};
use scraper::{Html, Selector};

use super::{BrowserHandle, BrowserLauncher, LoadWait, PageSession};

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";

#[derive(Debug, Clone)]
enum FakeResponse {
    Html(String),
    Timeout,
    Fail(String),
}

#[derive(Debug, Default)]
struct FakeState {
    routes: HashMap<String, FakeResponse>,
    navigations: Vec<String>,
    blocked_urls: Vec<Vec<String>>,
    launch_delay: Option<Duration>,
    fail_launch: bool,
    fail_isolation: bool,
    launches: usize,
    browsers_closed: usize,
    pages_opened: usize,
    pages_closed: usize,
    isolated_opened: usize,
    isolated_closed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWeb {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route(self, url: impl Into<String>, response: FakeResponse) -> Self {
        self.state().routes.insert(url.into(), response);
        self
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.route(url, FakeResponse::Html(html.into()))
    }

    /// Navigation to `url` runs into its timeout
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.route(url, FakeResponse::Timeout)
    }

    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.route(url, FakeResponse::Fail(message.into()))
    }

    pub fn with_launch_delay(self, delay: Duration) -> Self {
        self.state().launch_delay = Some(delay);
        self
    }

    pub fn with_launch_failure(self) -> Self {
        self.state().fail_launch = true;
        self
    }

    /// Every isolated context creation fails
    pub fn with_isolation_failure(self) -> Self {
        self.state().fail_isolation = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state().navigations.clone()
    }

    pub fn blocked_urls(&self) -> Vec<Vec<String>> {
        self.state().blocked_urls.clone()
    }

    pub fn launches(&self) -> usize {
        self.state().launches
    }

    pub fn browsers_closed(&self) -> usize {
        self.state().browsers_closed
    }

    /// (opened, closed) for shared-context pages
    pub fn pages(&self) -> (usize, usize) {
        let state = self.state();
        (state.pages_opened, state.pages_closed)
    }

    /// (opened, closed) for isolated pages
    pub fn isolated_pages(&self) -> (usize, usize) {
        let state = self.state();
        (state.isolated_opened, state.isolated_closed)
    }
}

#[async_trait]
impl BrowserLauncher for FakeWeb {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>> {
        let delay = {
            let mut state = self.state();
            if state.fail_launch {
                return Err(Error::Browser("Failed to launch browser".to_string()));
            }
            state.launches += 1;
            state.launch_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Box::new(FakeBrowser { web: self.clone() }))
    }
}

struct FakeBrowser {
    web: FakeWeb,
}

#[async_trait]
impl BrowserHandle for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        self.web.state().pages_opened += 1;
        Ok(Box::new(FakePage::new(self.web.clone(), false)))
    }

    async fn new_isolated_page(&self, blocked_urls: &[String]) -> Result<Box<dyn PageSession>> {
        let mut state = self.web.state();
        if state.fail_isolation {
            return Err(Error::Browser("Failed to create browser context".to_string()));
        }
        state.isolated_opened += 1;
        state.blocked_urls.push(blocked_urls.to_vec());
        Ok(Box::new(FakePage::new(self.web.clone(), true)))
    }

    async fn close(&self) -> Result<()> {
        self.web.state().browsers_closed += 1;
        Ok(())
    }
}

struct FakePage {
    web: FakeWeb,
    isolated: bool,
    current: Mutex<Option<String>>,
}

impl FakePage {
    fn new(web: FakeWeb, isolated: bool) -> Self {
        Self {
            web,
            isolated,
            current: Mutex::new(None),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<String>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn goto(&self, url: &str, _wait: LoadWait, timeout: Duration) -> Result<()> {
        let response = {
            let mut state = self.web.state();
            state.navigations.push(url.to_string());
            state.routes.get(url).cloned()
        };

        match response {
            Some(FakeResponse::Html(html)) => {
                *self.current() = Some(html);
                Ok(())
            }
            Some(FakeResponse::Timeout) => Err(Error::Timeout(timeout, url.to_string())),
            Some(FakeResponse::Fail(message)) => Err(Error::Browser(message)),
            None => Err(Error::Browser(format!("net::ERR_NAME_NOT_RESOLVED at {}", url))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let parsed = Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))?;
        let html = self.current().clone().unwrap_or_else(|| BLANK_PAGE.to_string());
        if Html::parse_document(&html).select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(Error::Timeout(timeout, format!("waiting for {}", selector)))
        }
    }

    async fn html(&self) -> Result<String> {
        Ok(self.current().clone().unwrap_or_else(|| BLANK_PAGE.to_string()))
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.web.state();
        if self.isolated {
            state.isolated_closed += 1;
        } else {
            state.pages_closed += 1;
        }
        Ok(())
    }
}
