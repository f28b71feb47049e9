use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Selectors and timings the page adapter uses against the host pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub sheets: SheetSelectors,
    pub questionnaire: QuestionnaireSelectors,
    pub timing: Timing,
}

impl AdapterConfig {
    /// Load a config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("Loaded adapter config from {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetSelectors {
    pub name_box: String,
    pub cell_input: String,
    pub dropdown_chip: String,
    pub sheet_tab: String,
    pub sheet_tab_name: String,
    /// Largest range `getRangeValues` / `setRangeValues` will walk.
    pub max_range_cells: u64,
}

impl Default for SheetSelectors {
    fn default() -> Self {
        Self {
            name_box: ".waffle-name-box".into(),
            cell_input: ".cell-input".into(),
            dropdown_chip: ".waffle-dropdown-chip".into(),
            sheet_tab: ".docs-sheet-tab".into(),
            sheet_tab_name: ".docs-sheet-tab .docs-sheet-tab-name".into(),
            max_range_cells: 10_000,
        }
    }
}

/// Marker selectors for the assessment form. Serialized as-is into the page
/// probes, so field names are camelCase on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionnaireSelectors {
    pub section: String,
    pub section_header: String,
    pub section_title: String,
    pub loading: String,
    pub question_name: String,
    pub question_number: String,
    pub question_container: String,
    pub multichoice: String,
    pub multichoice_option: String,
    pub multichoice_selected: String,
    pub button_row: String,
    pub button: String,
    pub button_selected: String,
    pub text_input: String,
    pub rich_text: String,
    pub container_depth: u32,
}

impl Default for QuestionnaireSelectors {
    fn default() -> Self {
        Self {
            section: ".assessment-section".into(),
            section_header: ".assessment-section__header".into(),
            section_title: ".assessment-section__title".into(),
            loading: ".loading-spinner, .ot-loading-indicator".into(),
            question_name: ".question-name".into(),
            question_number: ".question-number".into(),
            question_container: ".question-container".into(),
            multichoice: ".ot-multiselect".into(),
            multichoice_option: ".ot-multiselect__option".into(),
            multichoice_selected: "[aria-pressed='true']".into(),
            button_row: ".button-row".into(),
            button: "button".into(),
            button_selected: ".selected".into(),
            text_input: "textarea, input[type='text']".into(),
            rich_text: ".ql-editor, [contenteditable='true']".into(),
            container_depth: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timing {
    pub settle_ms: u64,
    pub key_hold_ms: u64,
    pub loading_poll_ms: u64,
    pub loading_timeout_ms: u64,
    pub reenable_poll_ms: u64,
    pub reenable_attempts: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_ms: 80,
            key_hold_ms: 100,
            loading_poll_ms: 500,
            loading_timeout_ms: 20_000,
            reenable_poll_ms: 500,
            reenable_attempts: 10,
        }
    }
}

impl Timing {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn key_hold(&self) -> Duration {
        Duration::from_millis(self.key_hold_ms)
    }
}
