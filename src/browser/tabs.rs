use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::navigation::Surface;
use super::BrowserSession;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NewTabParams {
    #[schemars(description = "URL to open in the new tab; it becomes the active tab")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TabIdParams {
    #[schemars(description = "Tab id as reported by list_tabs (the active tab if omitted)")]
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub tab_id: String,
    pub url: String,
    pub title: String,
    pub surface: Surface,
    pub active: bool,
}

pub async fn new_tab(session: &BrowserSession, params: &NewTabParams) -> Result<String> {
    let url = params.url.as_deref().unwrap_or("about:blank");
    let page = session.new_page(url).await?;
    Ok(page.target_id().as_ref().to_string())
}

/// Make a tab the one relay requests are routed to.
pub async fn select_tab(session: &BrowserSession, tab_id: &str) -> Result<()> {
    let mut pool = session.pool.lock().await;
    let page = pool
        .select_by_target_id(tab_id)
        .with_context(|| format!("No tab with id {}", tab_id))?;
    page.bring_to_front().await.context("Failed to focus tab")?;
    tracing::info!("Active tab is now {}", tab_id);
    Ok(())
}

pub async fn close_tab(session: &BrowserSession, params: &TabIdParams) -> Result<()> {
    let mut pool = session.pool.lock().await;
    let page = match params.tab_id {
        Some(ref tab_id) => pool
            .list_pages()
            .iter()
            .find(|p| p.target_id().as_ref() == tab_id.as_str())
            .cloned()
            .with_context(|| format!("No tab with id {}", tab_id))?,
        None => pool.active_page().cloned().context("No active tab")?,
    };
    let target_id = page.target_id().as_ref().to_string();
    page.close().await.context("Failed to close tab")?;
    pool.remove_page(&target_id);
    Ok(())
}

pub async fn list_tabs(session: &BrowserSession) -> Result<Vec<TabInfo>> {
    let pool = session.pool.lock().await;
    let active = pool
        .active_page()
        .map(|p| p.target_id().as_ref().to_string());
    let mut tabs = Vec::with_capacity(pool.page_count());
    for page in pool.list_pages() {
        let url = page.url().await.unwrap_or(None).unwrap_or_default();
        let title = page.get_title().await.unwrap_or(None).unwrap_or_default();
        let tab_id = page.target_id().as_ref().to_string();
        tabs.push(TabInfo {
            active: active.as_deref() == Some(tab_id.as_str()),
            surface: Surface::detect(&url),
            tab_id,
            url,
            title,
        });
    }
    Ok(tabs)
}
