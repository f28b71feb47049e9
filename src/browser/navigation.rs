use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};

/// Which host page a tab is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Spreadsheet,
    Other,
}

impl Surface {
    /// Only spreadsheet documents get the cell tools; anything else is treated
    /// as a questionnaire candidate.
    pub fn detect(url: &str) -> Self {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or("");
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        if host == "docs.google.com" && path.starts_with("spreadsheets") {
            Surface::Spreadsheet
        } else {
            Surface::Other
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NavigateParams {
    #[schemars(description = "URL of the spreadsheet or assessment to open")]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct NavigateResult {
    pub url: String,
    pub title: String,
    pub surface: Surface,
}

pub async fn navigate(page: &Page, params: &NavigateParams) -> Result<NavigateResult> {
    tracing::info!("Navigating to: {}", params.url);
    page.goto(&params.url)
        .await
        .with_context(|| format!("Failed to navigate to {}", params.url))?;

    // goto() waits for the load event; host apps keep rendering after that.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    page_info(page).await
}

pub async fn page_info(page: &Page) -> Result<NavigateResult> {
    let url = page.url().await?.unwrap_or_default();
    let title = page.get_title().await?.unwrap_or_default();
    let surface = Surface::detect(&url);
    Ok(NavigateResult {
        url,
        title,
        surface,
    })
}
