use anyhow::Result;
use serde::Deserialize;

use super::classify::classify;
use super::model::{Answer, AnswerType, AnswerValue, Part, Question};
use super::probe::{script_for_question, OptionState, QuestionProbe};
use crate::adapter::PageAdapter;
use crate::interaction::eval::js_str;
use crate::interaction::events::{input_events_js, mouse_events_js, MouseKind};
use crate::interaction::{poll_until, PollPolicy};

fn selected_labels(options: &[OptionState]) -> Vec<String> {
    options
        .iter()
        .filter(|o| o.selected)
        .map(|o| o.label.clone())
        .collect()
}

fn labels(options: &[OptionState]) -> Vec<String> {
    options.iter().map(|o| o.label.clone()).collect()
}

/// Value and offered labels of one non-composed widget.
pub(crate) fn read_widget(kind: AnswerType, probe: &QuestionProbe) -> (AnswerValue, Vec<String>) {
    match kind {
        AnswerType::Text => (
            AnswerValue::Text(probe.text_value.clone().unwrap_or_default()),
            Vec::new(),
        ),
        AnswerType::RichText => (
            AnswerValue::Text(probe.rich_value.clone().unwrap_or_default()),
            Vec::new(),
        ),
        AnswerType::Multichoice => (
            AnswerValue::Choices(selected_labels(&probe.multichoice)),
            labels(&probe.multichoice),
        ),
        AnswerType::Button => (
            AnswerValue::Text(
                selected_labels(&probe.buttons)
                    .into_iter()
                    .next()
                    .unwrap_or_default(),
            ),
            labels(&probe.buttons),
        ),
        AnswerType::Composed | AnswerType::Unknown => (AnswerValue::empty(kind), Vec::new()),
    }
}

pub(crate) fn read_answer(kind: AnswerType, probe: &QuestionProbe) -> Answer {
    if kind != AnswerType::Composed {
        let (answer, options) = read_widget(kind, probe);
        return Answer { answer, options };
    }

    let parts = classify(&probe.markers)
        .parts
        .into_iter()
        .map(|part_kind| {
            let (answer, options) = read_widget(part_kind, probe);
            Part {
                kind: part_kind,
                answer,
                options,
            }
        })
        .collect();
    Answer {
        answer: AnswerValue::Parts(parts),
        options: Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct Located {
    found: bool,
    #[serde(default)]
    probe: Option<QuestionProbe>,
}

/// Outcome of one reconciliation step on a multi-select option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OptionStep {
    Done,
    Clicked,
    Locked,
    Missing,
}

impl PageAdapter {
    /// Read the current value of `question` from the page. A question whose
    /// text is not on the page reads as the empty answer for its type.
    pub async fn grab_answer(&self, question: &Question) -> Result<Answer> {
        let selectors = &self.config().questionnaire;
        let js = script_for_question(
            selectors,
            &question.question_text,
            "{ found: false }",
            "return { found: true, probe: probe(c.querySelector(S.questionName) || c, c) };",
        );
        let located: Located = self.eval(js, "answer grab").await?;

        let probe = match located.probe {
            Some(probe) if located.found => probe,
            _ => {
                tracing::warn!("Question not found for grab: {:?}", question.question_text);
                return Ok(Answer::empty(question.answer_type));
            }
        };

        let kind = match question.answer_type {
            AnswerType::Unknown => classify(&probe.markers).answer_type,
            kind => kind,
        };
        Ok(read_answer(kind, &probe))
    }

    /// Write `question.user_answer` back through the page widgets. Nothing
    /// reports failure; misses and abandoned selections are logged.
    pub async fn push_answer(&self, question: &Question) -> Result<()> {
        let Some(value) = question.user_answer.as_ref() else {
            tracing::warn!("No user answer to push for {:?}", question.question_text);
            return Ok(());
        };

        if question.answer_type != AnswerType::Composed {
            return self
                .apply_answer(&question.question_text, question.answer_type, value)
                .await;
        }

        let Some(parts) = value.as_parts() else {
            tracing::warn!(
                "Composed question {:?} needs a list of typed parts",
                question.question_text
            );
            return Ok(());
        };
        for part in parts {
            self.apply_answer(&question.question_text, part.kind, &part.answer)
                .await?;
        }
        Ok(())
    }

    async fn apply_answer(&self, question_text: &str, kind: AnswerType, value: &AnswerValue) -> Result<()> {
        match (kind, value) {
            (AnswerType::Text, AnswerValue::Text(text)) => self.set_text_answer(question_text, text).await,
            (AnswerType::RichText, AnswerValue::Text(html)) => {
                self.set_rich_answer(question_text, html).await
            }
            (AnswerType::Multichoice, AnswerValue::Choices(wanted)) => {
                self.set_multichoice_answer(question_text, wanted).await
            }
            (AnswerType::Button, AnswerValue::Text(label)) => {
                self.choose_button(question_text, label).await
            }
            _ => {
                tracing::warn!(
                    "Cannot apply {:?} answer {:?} to {:?}",
                    kind,
                    value,
                    question_text
                );
                Ok(())
            }
        }
    }

    async fn set_text_answer(&self, question_text: &str, text: &str) -> Result<()> {
        let body = format!(
            r#"const el = c.querySelector(S.textInput);
            if (!el) return false;
            const proto = el instanceof HTMLTextAreaElement
                ? HTMLTextAreaElement.prototype
                : HTMLInputElement.prototype;
            const setter = Object.getOwnPropertyDescriptor(proto, 'value');
            if (setter && setter.set) {{ setter.set.call(el, {value}); }} else {{ el.value = {value}; }}
            {events}
            return true;"#,
            value = js_str(text),
            events = input_events_js("el", true),
        );
        self.write_widget(question_text, &body, "text answer").await
    }

    async fn set_rich_answer(&self, question_text: &str, html: &str) -> Result<()> {
        let body = format!(
            r#"const el = c.querySelector(S.richText);
            if (!el) return false;
            el.innerHTML = {value};
            {events}
            return true;"#,
            value = js_str(html),
            events = input_events_js("el", false),
        );
        self.write_widget(question_text, &body, "rich text answer").await
    }

    async fn choose_button(&self, question_text: &str, label: &str) -> Result<()> {
        let body = format!(
            r#"const wanted = {label};
            const el = buttons(c).find(b => text(b) === wanted);
            if (!el) return false;
            {click}
            return true;"#,
            label = js_str(label.trim()),
            click = mouse_events_js("el", &[MouseKind::Click]),
        );
        self.write_widget(question_text, &body, "button answer").await
    }

    async fn write_widget(&self, question_text: &str, body: &str, what: &str) -> Result<()> {
        let js = script_for_question(&self.config().questionnaire, question_text, "false", body);
        let written: bool = self.eval(js, what).await?;
        if !written {
            tracing::warn!("Could not write {} for {:?}", what, question_text);
        }
        Ok(())
    }

    /// Toggle options until the selected set equals `wanted`. The widget
    /// disables its options for a moment after each click, so every option
    /// gets a bounded number of attempts.
    async fn set_multichoice_answer(&self, question_text: &str, wanted: &[String]) -> Result<()> {
        let js = script_for_question(
            &self.config().questionnaire,
            question_text,
            "[]",
            "return multiOptions(c).map(text);",
        );
        let options: Vec<String> = self.eval(js, "multi-select options").await?;
        if options.is_empty() {
            tracing::warn!("No multi-select options found for {:?}", question_text);
            return Ok(());
        }

        for unknown in wanted.iter().filter(|w| !options.contains(w)) {
            tracing::warn!("{:?} is not an option of {:?}", unknown, question_text);
        }

        let timing = &self.config().timing;
        let policy = PollPolicy::attempts(
            std::time::Duration::from_millis(timing.reenable_poll_ms),
            timing.reenable_attempts,
        );

        for (index, label) in options.iter().enumerate() {
            let want = wanted.contains(label);
            let outcome = poll_until(policy, move || async move {
                match self.step_option(question_text, index, want).await {
                    Ok(OptionStep::Done) => true,
                    Ok(OptionStep::Missing) => {
                        tracing::warn!("Option {:?} vanished from {:?}", label, question_text);
                        true
                    }
                    Ok(OptionStep::Clicked) | Ok(OptionStep::Locked) => false,
                    Err(e) => {
                        tracing::debug!("Option check failed: {}", e);
                        false
                    }
                }
            })
            .await;

            if !outcome.is_ready() {
                tracing::warn!(
                    "Gave up setting {:?} to {} on {:?}",
                    label,
                    if want { "selected" } else { "unselected" },
                    question_text
                );
            }
        }
        Ok(())
    }

    async fn step_option(&self, question_text: &str, index: usize, want: bool) -> Result<OptionStep> {
        let body = format!(
            r#"const el = multiOptions(c)[{index}];
            if (!el) return 'missing';
            const state = optionState(el, S.multichoiceSelected);
            if (state.selected === {want}) return 'done';
            if (!state.enabled) return 'locked';
            {click}
            return 'clicked';"#,
            index = index,
            want = want,
            click = mouse_events_js("el", &[MouseKind::Click]),
        );
        let js = script_for_question(&self.config().questionnaire, question_text, "'missing'", &body);
        self.eval(js, "multi-select option").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::classify::Markers;

    fn option(label: &str, selected: bool) -> OptionState {
        OptionState {
            label: label.into(),
            selected,
            enabled: true,
        }
    }

    #[test]
    fn test_read_multichoice() {
        let probe = QuestionProbe {
            multichoice: vec![option("A", false), option("B", true), option("C", false)],
            ..Default::default()
        };
        let answer = read_answer(AnswerType::Multichoice, &probe);
        assert_eq!(answer.answer, AnswerValue::Choices(vec!["B".into()]));
        assert_eq!(answer.options, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_button_and_text() {
        let probe = QuestionProbe {
            buttons: vec![option("Yes", false), option("No", true)],
            text_value: Some("notes".into()),
            ..Default::default()
        };
        let button = read_answer(AnswerType::Button, &probe);
        assert_eq!(button.answer, AnswerValue::Text("No".into()));
        assert_eq!(button.options, vec!["Yes", "No"]);

        let text = read_answer(AnswerType::Text, &probe);
        assert_eq!(text.answer, AnswerValue::Text("notes".into()));
        assert!(text.options.is_empty());
    }

    #[test]
    fn test_read_composed_parts_follow_markers() {
        let probe = QuestionProbe {
            markers: Markers {
                multichoice_widget: true,
                multichoice_options: 2,
                button_rows: 1,
                ..Default::default()
            },
            multichoice: vec![option("A", true), option("B", false)],
            buttons: vec![option("N/A", true)],
            ..Default::default()
        };
        let answer = read_answer(AnswerType::Composed, &probe);
        let parts = answer.answer.as_parts().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].kind, AnswerType::Multichoice);
        assert_eq!(parts[0].answer, AnswerValue::Choices(vec!["A".into()]));
        assert_eq!(parts[1].kind, AnswerType::Button);
        assert_eq!(parts[1].answer, AnswerValue::Text("N/A".into()));
    }

    #[test]
    fn test_missing_values_read_empty() {
        let probe = QuestionProbe::default();
        assert_eq!(
            read_answer(AnswerType::RichText, &probe).answer,
            AnswerValue::Text(String::new())
        );
        assert_eq!(
            read_answer(AnswerType::Multichoice, &probe).answer,
            AnswerValue::Choices(Vec::new())
        );
    }
}
