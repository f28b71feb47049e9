use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::launcher;
use super::pool::TabPool;

/// Manages the CDP browser connection and page lifecycle.
pub struct BrowserSession {
    browser: Browser,
    _handler_task: tokio::task::JoinHandle<()>,
    _profile: tempfile::TempDir,
    pub pool: Arc<Mutex<TabPool>>,
}

impl BrowserSession {
    /// Launch a new browser and register its first page in `pool`.
    pub async fn launch(headless: bool, pool: Arc<Mutex<TabPool>>) -> Result<Self> {
        let profile = tempfile::tempdir().context("Failed to create Chrome profile dir")?;
        let chrome = launcher::find_chrome_binary()?;

        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .chrome_executable(chrome)
            .args(launcher::default_chrome_args(headless))
            .user_data_dir(profile.path())
            .window_size(1280, 720)
            .build()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        let (browser, mut handler) =
            Browser::launch(config).await.context("Failed to launch Chrome")?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to create initial page")?;
        pool.lock().await.add_page(page);

        tracing::info!("Browser session started (headless: {})", headless);

        Ok(Self {
            browser,
            _handler_task: handler_task,
            _profile: profile,
            pool,
        })
    }

    /// Open a new tab and make it active.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        let page = self
            .browser
            .new_page(url)
            .await
            .context("Failed to create new page")?;
        self.pool.lock().await.add_page(page.clone());
        Ok(page)
    }

    /// Close the browser and forget its tabs.
    pub async fn close(mut self) -> Result<()> {
        self.pool.lock().await.clear();
        self.browser.close().await.context("Failed to close Chrome")?;
        let _ = self.browser.wait().await;
        Ok(())
    }
}
