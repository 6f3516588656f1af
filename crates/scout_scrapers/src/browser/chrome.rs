use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use scout_core::{Error, Result};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{BrowserHandle, BrowserLauncher, LoadWait, PageSession};
use crate::config::ScraperConfig;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches a local Chrome/Chromium through the DevTools protocol
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: ScraperConfig,
}

impl ChromeLauncher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.config.request_timeout())
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !self.config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| Error::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            Error::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler: {}", e);
                }
            }
        });

        Ok(Box::new(ChromeBrowser {
            browser: Arc::new(RwLock::new(browser)),
            handler,
            user_agent: self.config.user_agent.clone(),
            settle: self.config.settle_delay(),
        }))
    }
}

pub struct ChromeBrowser {
    browser: Arc<RwLock<Browser>>,
    handler: JoinHandle<()>,
    user_agent: Option<String>,
    settle: Duration,
}

impl ChromeBrowser {
    async fn open(&self, target: CreateTargetParams, context: Option<BrowserContextId>) -> Result<ChromePage> {
        let page = self
            .browser
            .read()
            .await
            .new_page(target)
            .await
            .map_err(|e| Error::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| Error::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(ChromePage {
            page,
            context,
            browser: self.browser.clone(),
            settle: self.settle,
        })
    }
}

#[async_trait]
impl BrowserHandle for ChromeBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        Ok(Box::new(self.open(CreateTargetParams::new("about:blank"), None).await?))
    }

    async fn new_isolated_page(&self, blocked_urls: &[String]) -> Result<Box<dyn PageSession>> {
        let context = self
            .browser
            .read()
            .await
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| Error::Browser(format!("Failed to create browser context: {}", e)))?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(Error::Browser)?;

        let page = match self.open(target, Some(context.clone())).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(&self.browser, context).await;
                return Err(e);
            }
        };

        if !blocked_urls.is_empty() {
            if let Err(e) = block_urls(&page.page, blocked_urls).await {
                if let Err(close_err) = page.close().await {
                    warn!("⚠️ {}", close_err);
                }
                return Err(e);
            }
        }

        Ok(Box::new(page))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.write().await;
        browser
            .close()
            .await
            .map_err(|e| Error::Browser(format!("Failed to close browser: {}", e)))?;
        if let Err(e) = browser.wait().await {
            warn!("⚠️ Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

async fn block_urls(page: &Page, urls: &[String]) -> Result<()> {
    let params: SetBlockedUrLsParams = serde_json::from_value(serde_json::json!({ "urls": urls }))?;
    page.execute(params)
        .await
        .map_err(|e| Error::Browser(format!("Failed to block media requests: {}", e)))?;
    Ok(())
}

async fn dispose_context(browser: &RwLock<Browser>, context: BrowserContextId) {
    if let Err(e) = browser
        .read()
        .await
        .execute(DisposeBrowserContextParams::new(context))
        .await
    {
        warn!("⚠️ Failed to dispose browser context: {}", e);
    }
}

pub struct ChromePage {
    page: Page,
    context: Option<BrowserContextId>,
    browser: Arc<RwLock<Browser>>,
    settle: Duration,
}

#[async_trait]
impl PageSession for ChromePage {
    async fn goto(&self, url: &str, wait: LoadWait, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| Error::Timeout(timeout, url.to_string()))?
            .map_err(|e| Error::Browser(format!("Navigation to {} failed: {}", url, e)))?;

        if wait == LoadWait::NetworkIdle {
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let started = tokio::time::Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(Error::Timeout(timeout, format!("waiting for {}", selector)));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| Error::Browser(format!("Failed to read page content: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        let closed = self
            .page
            .clone()
            .close()
            .await
            .map_err(|e| Error::Browser(format!("Failed to close page: {}", e)));

        // the context goes away even when the tab refused to close
        if let Some(context) = self.context.clone() {
            dispose_context(&self.browser, context).await;
        }
        closed
    }
}
