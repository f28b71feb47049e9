use anyhow::Result;
use serde::Serialize;

use super::model::Question;
use super::probe::script_for_question;
use super::scrape::Expansion;
use crate::adapter::PageAdapter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageAdapter {
    /// Open the question's section if needed and bring the question into
    /// view. A missing question is reported, not raised.
    pub async fn scroll_to_question(&self, question: &Question) -> Result<ScrollOutcome> {
        if self.expand_section(question.section_index).await? == Expansion::Clicked {
            if let Err(e) = self.wait_for_loading().await {
                tracing::warn!("Section {} still loading: {}", question.section_index, e);
            }
        }

        let js = script_for_question(
            &self.config().questionnaire,
            &question.question_text,
            "false",
            "c.scrollIntoView({ behavior: 'smooth', block: 'center' });\nreturn true;",
        );
        let found: bool = self.eval(js, "question scroll").await?;
        if found {
            return Ok(ScrollOutcome {
                success: true,
                error: None,
            });
        }

        tracing::warn!("Question not found for scroll: {:?}", question.question_text);
        Ok(ScrollOutcome {
            success: false,
            error: Some("Question not found".into()),
        })
    }
}
