use std::fmt;

use serde::Serialize;

use crate::questionnaire::{AnswerType, AnswerValue, Question};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
}

/// The editable widget shown for a question, shaped by its answer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum Control {
    TextBox { value: String, rich: bool },
    CheckboxGroup { options: Vec<Checkbox> },
    Select { options: Vec<String>, selected: Option<String> },
    Group { parts: Vec<Control> },
    Unsupported,
}

fn control_for(kind: AnswerType, options: &[String], value: Option<&AnswerValue>) -> Control {
    match kind {
        AnswerType::Text | AnswerType::RichText => Control::TextBox {
            value: value
                .and_then(AnswerValue::as_text)
                .unwrap_or_default()
                .to_string(),
            rich: kind == AnswerType::RichText,
        },
        AnswerType::Multichoice => {
            let selected = value.and_then(AnswerValue::as_choices).unwrap_or_default();
            Control::CheckboxGroup {
                options: options
                    .iter()
                    .map(|label| Checkbox {
                        label: label.clone(),
                        checked: selected.contains(label),
                    })
                    .collect(),
            }
        }
        AnswerType::Button => Control::Select {
            options: options.to_vec(),
            selected: value
                .and_then(AnswerValue::as_text)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        },
        AnswerType::Composed | AnswerType::Unknown => Control::Unsupported,
    }
}

/// A question as the panel lists it, with the edited value when there is
/// one and the grabbed value otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub number: String,
    pub text: String,
    pub section_index: usize,
    pub edited: bool,
    pub control: Control,
}

impl QuestionView {
    pub fn render(question: &Question) -> Self {
        let value = question.user_answer.as_ref().or(question.answer.as_ref());

        let control = if question.answer_type == AnswerType::Composed {
            let parts = value.and_then(AnswerValue::as_parts).unwrap_or_default();
            Control::Group {
                parts: question
                    .parts
                    .iter()
                    .map(|spec| {
                        let part_value = parts.iter().find(|p| p.kind == spec.kind).map(|p| &p.answer);
                        control_for(spec.kind, &spec.options, part_value)
                    })
                    .collect(),
            }
        } else {
            control_for(question.answer_type, &question.options, value)
        };

        Self {
            id: question.id.clone(),
            number: question.question_number.clone(),
            text: question.question_text.clone(),
            section_index: question.section_index,
            edited: question.user_answer.is_some(),
            control,
        }
    }
}

fn write_control(f: &mut fmt::Formatter<'_>, control: &Control, indent: usize) -> fmt::Result {
    let pad = " ".repeat(indent);
    match control {
        Control::TextBox { value, rich } => {
            let label = if *rich { "rich text" } else { "text" };
            writeln!(f, "{}{}: {:?}", pad, label, value)
        }
        Control::CheckboxGroup { options } => {
            for option in options {
                let mark = if option.checked { "x" } else { " " };
                writeln!(f, "{}[{}] {}", pad, mark, option.label)?;
            }
            Ok(())
        }
        Control::Select { options, selected } => {
            let rendered: Vec<String> = options
                .iter()
                .map(|o| {
                    if selected.as_deref() == Some(o.as_str()) {
                        format!("({})", o)
                    } else {
                        o.clone()
                    }
                })
                .collect();
            writeln!(f, "{}select: {}", pad, rendered.join(" | "))
        }
        Control::Group { parts } => {
            for (i, part) in parts.iter().enumerate() {
                writeln!(f, "{}part {}:", pad, i)?;
                write_control(f, part, indent + 2)?;
            }
            Ok(())
        }
        Control::Unsupported => writeln!(f, "{}(no editable widget)", pad),
    }
}

impl fmt::Display for QuestionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = if self.number.is_empty() {
            String::new()
        } else {
            format!("{} ", self.number)
        };
        let edited = if self.edited { " *edited*" } else { "" };
        writeln!(f, "{}{} [{}]{}", number, self.text, self.id, edited)?;
        write_control(f, &self.control, 2)
    }
}
