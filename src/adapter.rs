use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;

use crate::config::AdapterConfig;
use crate::interaction::evaluate;

/// The page-embedded half of the automation: reads and writes host page
/// state for one tab. Spreadsheet operations live in [`crate::sheets`],
/// assessment operations in [`crate::questionnaire`].
#[derive(Clone)]
pub struct PageAdapter {
    page: Page,
    config: Arc<AdapterConfig>,
}

impl PageAdapter {
    pub fn new(page: Page, config: Arc<AdapterConfig>) -> Self {
        Self { page, config }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub(crate) async fn eval<T: DeserializeOwned>(&self, js: String, what: &str) -> Result<T> {
        evaluate(&self.page, js, what).await
    }

    /// Evaluate a snippet for its side effects only.
    pub(crate) async fn run(&self, js: String, what: &str) -> Result<()> {
        let _: bool = self.eval(js, what).await?;
        Ok(())
    }
}
