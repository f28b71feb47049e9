use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use uuid::Uuid;

use super::answer::{read_answer, read_widget};
use super::classify::classify;
use super::model::{AnswerType, PartSpec, Question, Section};
use super::probe::{script, QuestionProbe, SectionProbe};
use crate::adapter::PageAdapter;
use crate::error::WaitError;
use crate::interaction::eval::js_str;
use crate::interaction::events::{mouse_events_js, MouseKind};
use crate::interaction::wait::wait_for_absent;
use crate::interaction::PollPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expansion {
    /// The section was already open.
    Expanded,
    /// Its header was clicked; content may still be loading.
    Clicked,
    Missing,
}

/// Build a question record from a page probe. Answers are attached only when
/// `with_answers` is set.
pub(crate) fn question_from_probe(
    probe: &QuestionProbe,
    section_index: usize,
    with_answers: bool,
) -> Question {
    let classification = classify(&probe.markers);
    let mut question = Question::new(probe.text.clone(), classification.answer_type);
    question.question_number = probe.number.clone();
    question.section_index = section_index;

    match classification.answer_type {
        AnswerType::Composed => {
            question.parts = classification
                .parts
                .iter()
                .map(|&kind| PartSpec {
                    kind,
                    options: read_widget(kind, probe).1,
                })
                .collect();
        }
        kind => question.options = read_widget(kind, probe).1,
    }

    if with_answers {
        question.answer = Some(read_answer(classification.answer_type, probe).answer);
    }
    question
}

impl PageAdapter {
    pub async fn section_count(&self) -> Result<usize> {
        let js = script(
            &self.config().questionnaire,
            "return document.querySelectorAll(S.section).length;",
        );
        self.eval(js, "section count").await
    }

    /// Open the section at `index` (page order) by clicking its header,
    /// unless the header already reports itself expanded.
    pub async fn expand_section(&self, index: usize) -> Result<Expansion> {
        let body = format!(
            r#"const section = document.querySelectorAll(S.section)[{index}];
            if (!section) return 'missing';
            const header = section.querySelector(S.sectionHeader);
            if (!header) return 'missing';
            if (header.getAttribute('aria-expanded') === 'true') return 'expanded';
            {click}
            return 'clicked';"#,
            index = index,
            click = mouse_events_js("header", &[MouseKind::Click]),
        );
        let js = script(&self.config().questionnaire, &body);
        self.eval(js, "section expand").await
    }

    /// Wait for every loading indicator to leave the page.
    pub async fn wait_for_loading(&self) -> Result<(), WaitError> {
        let timing = &self.config().timing;
        let policy = PollPolicy::deadline(
            Duration::from_millis(timing.loading_poll_ms),
            Duration::from_millis(timing.loading_timeout_ms),
        );
        wait_for_absent(self.page(), &self.config().questionnaire.loading, policy).await
    }

    /// Probe the question names in the document that belong to section
    /// `index`: its own descendants plus any rendered outside every section
    /// element. Names already claimed under `scrape_id` are skipped.
    async fn probe_section(&self, index: usize, scrape_id: &str) -> Result<SectionProbe> {
        let body = format!(
            r#"const section = document.querySelectorAll(S.section)[{index}];
            if (!section) return {{ name: '', questions: [] }};
            const title = section.querySelector(S.sectionTitle);
            const scrapeId = {scrape_id};
            const owned = nameEl => {{
                const owner = nameEl.closest(S.section);
                return !owner || owner === section;
            }};
            return {{
                name: title ? text(title) : '',
                questions: Array.from(document.querySelectorAll(S.questionName))
                    .filter(nameEl => nameEl.dataset.formsyncScrape !== scrapeId && owned(nameEl))
                    .map(nameEl => {{
                        nameEl.dataset.formsyncScrape = scrapeId;
                        return probe(nameEl, containerOf(nameEl));
                    }}),
            }};"#,
            index = index,
            scrape_id = js_str(scrape_id),
        );
        let js = script(&self.config().questionnaire, &body);
        self.eval(js, "section probe").await
    }

    /// Walk every section in page order: expand it, wait for it to load,
    /// then classify the questions it rendered. Sections are processed one at a time
    /// because opening one can collapse the previous. A section that times
    /// out is still returned with whatever had rendered.
    pub async fn scrape(&self, with_answers: bool) -> Result<Vec<Section>> {
        let count = self.section_count().await?;
        let scrape_id = Uuid::new_v4().simple().to_string();
        tracing::info!("Scraping {} sections (answers: {})", count, with_answers);

        let mut sections = Vec::with_capacity(count);
        for index in 0..count {
            match self.expand_section(index).await? {
                Expansion::Missing => {
                    tracing::warn!("Section {} has no header; reading as-is", index);
                }
                Expansion::Expanded | Expansion::Clicked => {
                    if let Err(e) = self.wait_for_loading().await {
                        tracing::warn!("Section {} may be incomplete: {}", index, e);
                    }
                }
            }

            let probe = self.probe_section(index, &scrape_id).await?;
            let questions: Vec<Question> = probe
                .questions
                .iter()
                .map(|q| question_from_probe(q, index, with_answers))
                .collect();
            tracing::debug!("Section {} ({:?}): {} questions", index, probe.name, questions.len());

            sections.push(Section {
                section_name: probe.name,
                section_id: index,
                questions,
            });
        }
        Ok(sections)
    }
}
