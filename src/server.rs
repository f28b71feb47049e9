use rmcp::model::*;
use rmcp::tool;
use rmcp::{Error as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::browser::{navigation, tabs, BrowserSession, TabPool};
use crate::config::AdapterConfig;
use crate::panel::{CellContent, Edit, Panel, QuestionView};
use crate::relay::{Coordinator, RelayHandle, Request, Response};
use crate::sheets::CellRef;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScrapeParams {
    #[schemars(description = "Also read each question's current answer (default: true)")]
    pub with_answers: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QuestionIdParams {
    #[schemars(description = "Question id as shown by list_questions")]
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditAnswerParams {
    #[schemars(description = "Question id as shown by list_questions")]
    pub id: String,
    #[schemars(
        description = "The change: {kind: setText, value} | {kind: toggle, option} | \
                       {kind: setChoices, options} | {kind: select, option} | \
                       {kind: part, index, edit}"
    )]
    pub edit: Edit,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CellParams {
    #[schemars(description = "Cell address such as \"B7\"")]
    pub cell: CellRef,
    #[schemars(description = "Return to the previously selected cell afterwards (default: true)")]
    pub restore_selection: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetCellParams {
    #[schemars(description = "Cell address; the selected cell if omitted")]
    pub cell: Option<CellRef>,
    pub value: String,
    #[schemars(description = "Leave the written cell selected (default: true)")]
    pub preserve_selection: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SheetParams {
    #[schemars(description = "Exact sheet tab name")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RangeParams {
    #[schemars(description = "Range such as \"A1:C4\"")]
    pub range: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SelectRangeParams {
    #[schemars(description = "Range such as \"A1:C4\"; reports the current selection if omitted")]
    pub range: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetRangeParams {
    #[schemars(description = "Range such as \"A1:C4\"")]
    pub range: String,
    #[schemars(description = "Rows of cell values, row-major from the range's top-left")]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SaveCellParams {
    #[schemars(description = "Editor content; JSON is compacted and line breaks are dropped")]
    pub content: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RelayMessageParams {
    #[schemars(description = "A raw coordinator message with an `action` field")]
    pub message: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SelectTabParams {
    #[schemars(description = "Tab id as reported by list_tabs")]
    pub tab_id: String,
}

fn internal(e: impl std::fmt::Display) -> McpError {
    McpError::internal_error(format!("{:#}", e), None)
}

fn cell_content_text(content: &CellContent) -> String {
    match content {
        CellContent::Json(value) => format!(
            "JSON cell:\n{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        ),
        CellContent::RichText(text) => format!("Rich text cell:\n{}", text),
    }
}

/// The MCP server: the panel's controls exposed as tools, backed by a
/// coordinator routing to the active Chrome tab.
#[derive(Clone)]
pub struct FormsyncServer {
    session: Arc<Mutex<Option<BrowserSession>>>,
    tabs: Arc<Mutex<TabPool>>,
    relay: RelayHandle,
    panel: Arc<Mutex<Panel>>,
    headless: bool,
}

impl FormsyncServer {
    /// Must be called inside a tokio runtime; the coordinator task starts
    /// immediately, Chrome only on the first tool call that needs it.
    pub fn new(headless: bool, config: AdapterConfig) -> Self {
        let tabs = Arc::new(Mutex::new(TabPool::new()));
        let relay = Coordinator::new(tabs.clone(), Arc::new(config)).spawn();
        Self {
            session: Arc::new(Mutex::new(None)),
            tabs,
            panel: Arc::new(Mutex::new(Panel::new(relay.clone()))),
            relay,
            headless,
        }
    }

    async fn ensure_browser(&self) -> Result<(), McpError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            tracing::info!("Launching browser (headless: {})", self.headless);
            let s = BrowserSession::launch(self.headless, self.tabs.clone())
                .await
                .map_err(|e| internal(format!("Failed to launch browser: {:#}", e)))?;
            *session = Some(s);
        }
        Ok(())
    }

    /// Close Chrome if it was ever started.
    pub async fn shutdown(&self) {
        if let Some(session) = self.session.lock().await.take() {
            if let Err(e) = session.close().await {
                tracing::warn!("Browser did not close cleanly: {:#}", e);
            }
        }
    }

    async fn with_page<F, Fut, T>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(chromiumoxide::page::Page) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        self.ensure_browser().await?;
        let page = self
            .tabs
            .lock()
            .await
            .active_page()
            .cloned()
            .ok_or_else(|| internal("No active tab"))?;
        f(page).await.map_err(internal)
    }

    /// Send one request through the coordinator, surfacing failure replies
    /// as tool errors.
    async fn send_request(&self, request: Request) -> Result<Response, McpError> {
        self.ensure_browser().await?;
        let action = request.action();
        let response = self.relay.send(request).await;
        match response.error() {
            Some(error) => Err(internal(format!("{} failed: {}", action, error))),
            None => Ok(response),
        }
    }

    async fn with_panel<F, Fut, T>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(OwnedMutexGuard<Panel>) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        self.ensure_browser().await?;
        let panel = self.panel.clone().lock_owned().await;
        f(panel).await.map_err(internal)
    }

    fn text_result(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(msg)]))
    }

    fn json_result(value: impl serde::Serialize) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| internal(format!("JSON error: {}", e)))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool(tool_box)]
impl ServerHandler for FormsyncServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "formsync: fill spreadsheet cells and questionnaire answers in Chrome. \
                 Start with `navigate`, then `scrape_sections` on a questionnaire or the \
                 cell tools on a spreadsheet. Edits stay local until `push_answer`."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tool(tool_box)]
impl FormsyncServer {
    // ── Tabs ────────────────────────────────────────────────────────────

    #[tool(description = "Navigate the active tab to a URL. Reports whether it is a spreadsheet.")]
    async fn navigate(
        &self,
        #[tool(aggr)] params: navigation::NavigateParams,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .with_page(|page| async move { navigation::navigate(&page, &params).await })
            .await?;
        Self::json_result(result)
    }

    #[tool(description = "Open a new tab and make it the active one.")]
    async fn new_tab(
        &self,
        #[tool(aggr)] params: tabs::NewTabParams,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_browser().await?;
        let session = self.session.lock().await;
        let session_ref = session.as_ref().ok_or_else(|| internal("Browser is not running"))?;
        let tab_id = tabs::new_tab(session_ref, &params).await.map_err(internal)?;
        Self::text_result(format!("Opened new tab: {}", tab_id))
    }

    #[tool(description = "Route all further requests to the given tab.")]
    async fn select_tab(
        &self,
        #[tool(aggr)] params: SelectTabParams,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_browser().await?;
        let session = self.session.lock().await;
        let session_ref = session.as_ref().ok_or_else(|| internal("Browser is not running"))?;
        tabs::select_tab(session_ref, &params.tab_id)
            .await
            .map_err(internal)?;
        Self::text_result(format!("Active tab: {}", params.tab_id))
    }

    #[tool(description = "Close a tab (the active one if no id is given).")]
    async fn close_tab(
        &self,
        #[tool(aggr)] params: tabs::TabIdParams,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_browser().await?;
        let session = self.session.lock().await;
        let session_ref = session.as_ref().ok_or_else(|| internal("Browser is not running"))?;
        tabs::close_tab(session_ref, &params).await.map_err(internal)?;
        Self::text_result("Closed tab")
    }

    #[tool(description = "List open tabs with their surface and which one is active.")]
    async fn list_tabs(&self) -> Result<CallToolResult, McpError> {
        self.ensure_browser().await?;
        let session = self.session.lock().await;
        let session_ref = session.as_ref().ok_or_else(|| internal("Browser is not running"))?;
        let result = tabs::list_tabs(session_ref).await.map_err(internal)?;
        Self::json_result(result)
    }

    // ── Questionnaire ───────────────────────────────────────────────────

    #[tool(description = "Scrape every questionnaire section, replacing the current session. Lists the questions found.")]
    async fn scrape_sections(
        &self,
        #[tool(aggr)] params: ScrapeParams,
    ) -> Result<CallToolResult, McpError> {
        let with_answers = params.with_answers.unwrap_or(true);
        let listing = self
            .with_panel(|mut panel| async move {
                panel.scrape(with_answers).await?;
                Ok(panel
                    .views()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            })
            .await?;
        Self::text_result(listing)
    }

    #[tool(description = "Show the last scrape exactly as it was read from the page.")]
    async fn show_raw_output(&self) -> Result<CallToolResult, McpError> {
        let raw = self.panel.lock().await.raw_output().map_err(internal)?;
        Self::text_result(raw)
    }

    #[tool(description = "List the scraped questions as form controls, with local edits applied.")]
    async fn list_questions(&self) -> Result<CallToolResult, McpError> {
        let views = self.panel.lock().await.views();
        if views.is_empty() {
            return Self::text_result("No questions; run scrape_sections first");
        }
        Self::json_result(views)
    }

    #[tool(description = "Change a question's answer locally. Nothing is sent until push_answer.")]
    async fn edit_answer(
        &self,
        #[tool(aggr)] params: EditAnswerParams,
    ) -> Result<CallToolResult, McpError> {
        let mut panel = self.panel.lock().await;
        let question = panel.edit(&params.id, &params.edit).map_err(internal)?;
        Self::text_result(QuestionView::render(question).to_string())
    }

    #[tool(description = "Re-read one question's answer from the page.")]
    async fn grab_answer(
        &self,
        #[tool(aggr)] params: QuestionIdParams,
    ) -> Result<CallToolResult, McpError> {
        let answer = self
            .with_panel(|mut panel| async move { panel.grab(&params.id).await })
            .await?;
        Self::json_result(answer)
    }

    #[tool(description = "Write one question's edited answer back to the page.")]
    async fn push_answer(
        &self,
        #[tool(aggr)] params: QuestionIdParams,
    ) -> Result<CallToolResult, McpError> {
        let id = params.id.clone();
        self.with_panel(|mut panel| async move { panel.push(&params.id).await })
            .await?;
        Self::text_result(format!("Pushed answer for {}", id))
    }

    #[tool(description = "Open a question's section and scroll it into view.")]
    async fn scroll_to_question(
        &self,
        #[tool(aggr)] params: QuestionIdParams,
    ) -> Result<CallToolResult, McpError> {
        let id = params.id.clone();
        self.with_panel(|mut panel| async move { panel.navigate_to(&params.id).await })
            .await?;
        Self::text_result(format!("Scrolled to {}", id))
    }

    // ── Spreadsheet ─────────────────────────────────────────────────────

    #[tool(description = "Get the address of the selected cell.")]
    async fn get_current_cell(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(self.send_request(Request::GetCurrentCellIndex).await?)
    }

    #[tool(description = "Read a cell's value.")]
    async fn get_cell_value(
        &self,
        #[tool(aggr)] params: CellParams,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .send_request(Request::GetCellValue {
                cell_index: params.cell,
                restore_selection: params.restore_selection.unwrap_or(true),
            })
            .await?;
        Self::json_result(response)
    }

    #[tool(description = "Write a value into a cell.")]
    async fn set_cell_value(
        &self,
        #[tool(aggr)] params: SetCellParams,
    ) -> Result<CallToolResult, McpError> {
        self.send_request(Request::SetCellValue {
            cell_index: params.cell,
            cell_value: params.value,
            preserve_selection: params.preserve_selection.unwrap_or(true),
        })
        .await?;
        Self::text_result("Cell updated")
    }

    #[tool(description = "List the options of a cell's dropdown.")]
    async fn get_dropdown_options(
        &self,
        #[tool(aggr)] params: RangeParams,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .send_request(Request::GetDropdownListByRange {
                range: params.range,
            })
            .await?;
        Self::json_result(response)
    }

    #[tool(description = "List the sheet tab names.")]
    async fn list_sheets(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(self.send_request(Request::GetSheetNames).await?)
    }

    #[tool(description = "Switch to a sheet tab by its exact name.")]
    async fn select_sheet_tab(
        &self,
        #[tool(aggr)] params: SheetParams,
    ) -> Result<CallToolResult, McpError> {
        let name = params.name.clone();
        self.send_request(Request::SheetSelected {
            sheet_name: params.name,
        })
        .await?;
        Self::text_result(format!("Selected sheet {:?}", name))
    }

    #[tool(description = "Select a range, or report the current selection when no range is given.")]
    async fn select_range(
        &self,
        #[tool(aggr)] params: SelectRangeParams,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(self.send_request(Request::SelectRange { range: params.range }).await?)
    }

    #[tool(description = "Get the selected range.")]
    async fn get_selected_range(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(self.send_request(Request::GetSelectedRange).await?)
    }

    #[tool(description = "Read every value in a range, row by row.")]
    async fn get_range_values(
        &self,
        #[tool(aggr)] params: RangeParams,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(self.send_request(Request::GetRangeValues { range: params.range }).await?)
    }

    #[tool(description = "Write rows of values into a range.")]
    async fn set_range_values(
        &self,
        #[tool(aggr)] params: SetRangeParams,
    ) -> Result<CallToolResult, McpError> {
        self.send_request(Request::SetRangeValues {
            range: params.range,
            values: Some(params.values),
        })
        .await?;
        Self::text_result("Range updated")
    }

    #[tool(description = "Load the selected cell into the editor, detecting JSON or rich text.")]
    async fn open_cell(&self) -> Result<CallToolResult, McpError> {
        let content = self
            .with_panel(|mut panel| async move { panel.open_cell().await })
            .await?;
        Self::text_result(cell_content_text(&content))
    }

    #[tool(description = "Reload the editor only if the selected cell changed since the last check.")]
    async fn refresh_cell(&self) -> Result<CallToolResult, McpError> {
        let content = self
            .with_panel(|mut panel| async move { panel.refresh_cell().await })
            .await?;
        match content {
            Some(content) => Self::text_result(cell_content_text(&content)),
            None => Self::text_result("Selection unchanged"),
        }
    }

    #[tool(description = "Save editor content into the selected cell.")]
    async fn save_cell(
        &self,
        #[tool(aggr)] params: SaveCellParams,
    ) -> Result<CallToolResult, McpError> {
        let content = CellContent::detect(&params.content);
        self.with_panel(|mut panel| async move { panel.save_cell(&content).await })
            .await?;
        Self::text_result("Cell saved")
    }

    // ── Raw ─────────────────────────────────────────────────────────────

    #[tool(description = "Send a raw coordinator message and return its reply unchanged.")]
    async fn relay_message(
        &self,
        #[tool(aggr)] params: RelayMessageParams,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_browser().await?;
        let response = self.panel.lock().await.send_raw(params.message).await;
        Self::json_result(response)
    }
}
