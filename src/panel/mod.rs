//! The control surface: issues relay requests, keeps the scraped questions
//! for editing, and renders them as form controls.

pub mod cell_editor;
pub mod controls;
pub mod edit;
pub mod session;

use anyhow::{bail, Context, Result};

use crate::questionnaire::{Answer, Question};
use crate::relay::{RelayHandle, Request, Response};

pub use cell_editor::CellContent;
pub use controls::{Control, QuestionView};
pub use edit::{Edit, EditError};
pub use session::PanelSession;

fn unexpected(action: &str, response: Response) -> anyhow::Error {
    match response.error() {
        Some(error) => anyhow::anyhow!("{} failed: {}", action, error),
        None => anyhow::anyhow!("{} returned an unexpected response: {:?}", action, response),
    }
}

pub struct Panel {
    relay: RelayHandle,
    session: Option<PanelSession>,
    last_cell_index: Option<String>,
}

impl Panel {
    pub fn new(relay: RelayHandle) -> Self {
        Self {
            relay,
            session: None,
            last_cell_index: None,
        }
    }

    pub fn session(&self) -> Option<&PanelSession> {
        self.session.as_ref()
    }

    fn session_mut(&mut self) -> Result<&mut PanelSession> {
        self.session
            .as_mut()
            .context("Nothing scraped yet; run a scrape first")
    }

    fn question(&self, id: &str) -> Result<&Question> {
        self.session
            .as_ref()
            .context("Nothing scraped yet; run a scrape first")?
            .question(id)
            .with_context(|| format!("No question with id {}", id))
    }

    /// Scrape the form and replace the current session wholesale.
    pub async fn scrape(&mut self, with_answers: bool) -> Result<&PanelSession> {
        let request = if with_answers {
            Request::ScrapeSectionsWithAnswers
        } else {
            Request::ScrapeSections
        };
        let action = request.action();
        let sections = match self.relay.send(request).await {
            Response::Sections(sections) => sections,
            other => return Err(unexpected(action, other)),
        };

        let session = PanelSession::new(sections);
        tracing::info!(
            "Scraped {} questions in {} sections",
            session.questions().len(),
            session.sections().len()
        );
        Ok(self.session.insert(session))
    }

    /// The last scrape exactly as the page adapter returned it.
    pub fn raw_output(&self) -> Result<String> {
        let session = self
            .session
            .as_ref()
            .context("Nothing scraped yet; run a scrape first")?;
        Ok(serde_json::to_string_pretty(session.sections())?)
    }

    /// Re-read one question's answer from the page into the session.
    pub async fn grab(&mut self, id: &str) -> Result<Answer> {
        let question = self.question(id)?.clone();
        let answer = match self.relay.send(Request::GrabAnswer(question)).await {
            Response::Answer(answer) => answer,
            other => return Err(unexpected("GRAB_ANSWER", other)),
        };

        let question = self
            .session_mut()?
            .question_mut(id)
            .with_context(|| format!("No question with id {}", id))?;
        question.answer = Some(answer.answer.clone());
        if !answer.options.is_empty() {
            question.options = answer.options.clone();
        }
        Ok(answer)
    }

    /// Send the edited answer of one question back to the page.
    pub async fn push(&mut self, id: &str) -> Result<()> {
        let question = self.question(id)?.clone();
        if question.user_answer.is_none() {
            bail!("Question {} has no edits to push", id);
        }
        match self.relay.send(Request::PushAnswer(question)).await {
            Response::Status { success: true, .. } => Ok(()),
            other => Err(unexpected("PUSH_ANSWER", other)),
        }
    }

    /// Bring one question into view on the page.
    pub async fn navigate_to(&mut self, id: &str) -> Result<()> {
        let question = self.question(id)?.clone();
        match self.relay.send(Request::ScrollToQuestion(question)).await {
            Response::Status { success: true, .. } => Ok(()),
            other => Err(unexpected("SCROLL_TO_QUESTION", other)),
        }
    }

    /// Apply an edit to the in-memory question. Nothing is sent.
    pub fn edit(&mut self, id: &str, change: &Edit) -> Result<&Question> {
        let question = self
            .session_mut()?
            .question_mut(id)
            .with_context(|| format!("No question with id {}", id))?;
        edit::apply(question, change)?;
        Ok(question)
    }

    pub fn views(&self) -> Vec<QuestionView> {
        self.session
            .as_ref()
            .map(|s| s.questions().iter().map(QuestionView::render).collect())
            .unwrap_or_default()
    }

    /// Load the selected cell into the editor if the selection moved since
    /// the last check.
    pub async fn refresh_cell(&mut self) -> Result<Option<CellContent>> {
        let index = match self.relay.send(Request::GetCurrentCellIndex).await {
            Response::CellIndex { cell_index } => cell_index,
            other => return Err(unexpected("getCurrentCellIndex", other)),
        };
        if self.last_cell_index.as_deref() == Some(index.as_str()) {
            return Ok(None);
        }
        self.last_cell_index = Some(index);
        self.open_cell().await.map(Some)
    }

    pub async fn open_cell(&mut self) -> Result<CellContent> {
        match self.relay.send(Request::GetCurrentCellValue).await {
            Response::CellValue { cell_value } => Ok(CellContent::detect(&cell_value)),
            other => Err(unexpected("getCurrentCellValue", other)),
        }
    }

    /// Write editor content back into the selected cell.
    pub async fn save_cell(&mut self, content: &CellContent) -> Result<()> {
        let request = Request::SetCellValue {
            cell_index: None,
            cell_value: content.to_saved(),
            preserve_selection: true,
        };
        match self.relay.send(request).await {
            Response::Status { success: true, .. } => Ok(()),
            other => Err(unexpected("setCellValue", other)),
        }
    }

    /// Pass a raw message straight through the relay.
    pub async fn send_raw(&self, message: serde_json::Value) -> Response {
        self.relay.send_message(message).await
    }
}
