use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;

/// Evaluate a JS expression in the page and deserialize its value.
///
/// Page snippets must return a JSON-serializable value; `undefined` or `null`
/// fails deserialization.
pub async fn evaluate<T: DeserializeOwned>(page: &Page, js: String, what: &str) -> Result<T> {
    page.evaluate(js)
        .await
        .with_context(|| format!("Failed to evaluate {}", what))?
        .into_value()
        .with_context(|| format!("Failed to parse {} result", what))
}

/// Embed a Rust string as a JS string literal.
pub fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
