use serde::Deserialize;
use thiserror::Error;

use crate::questionnaire::{AnswerType, AnswerValue, Part, Question};

/// A change made through one of the panel controls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Edit {
    /// Replace the text of a text box or rich-text editor.
    SetText { value: String },
    /// Flip one checkbox of a multi-select.
    Toggle { option: String },
    /// Replace the whole multi-select selection.
    SetChoices { options: Vec<String> },
    /// Pick one option of a single-select.
    Select { option: String },
    /// Edit one part of a composed question.
    Part { index: usize, edit: Box<Edit> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{edit} does not apply to a {kind:?} question")]
    WrongType { edit: &'static str, kind: AnswerType },
    #[error("{0:?} is not one of the options")]
    UnknownOption(String),
    #[error("Question has no part {0}")]
    NoSuchPart(usize),
}

impl Edit {
    fn name(&self) -> &'static str {
        match self {
            Edit::SetText { .. } => "setText",
            Edit::Toggle { .. } => "toggle",
            Edit::SetChoices { .. } => "setChoices",
            Edit::Select { .. } => "select",
            Edit::Part { .. } => "part",
        }
    }
}

/// Update `question.user_answer`, starting from the previous edit or, failing
/// that, the grabbed answer.
pub fn apply(question: &mut Question, edit: &Edit) -> Result<(), EditError> {
    let current = question
        .user_answer
        .clone()
        .or_else(|| question.answer.clone())
        .unwrap_or_else(|| AnswerValue::empty(question.answer_type));

    let updated = if question.answer_type == AnswerType::Composed {
        apply_to_parts(question, current, edit)?
    } else {
        apply_to_widget(question.answer_type, &question.options, current, edit)?
    };
    question.user_answer = Some(updated);
    Ok(())
}

fn apply_to_parts(question: &Question, current: AnswerValue, edit: &Edit) -> Result<AnswerValue, EditError> {
    let Edit::Part { index, edit: inner } = edit else {
        return Err(EditError::WrongType {
            edit: edit.name(),
            kind: AnswerType::Composed,
        });
    };

    let existing = current.as_parts().map(<[Part]>::to_vec).unwrap_or_default();
    let mut parts: Vec<Part> = question
        .parts
        .iter()
        .map(|spec| {
            existing
                .iter()
                .find(|p| p.kind == spec.kind)
                .cloned()
                .unwrap_or_else(|| Part {
                    kind: spec.kind,
                    answer: AnswerValue::empty(spec.kind),
                    options: spec.options.clone(),
                })
        })
        .collect();

    let part = parts.get_mut(*index).ok_or(EditError::NoSuchPart(*index))?;
    let options = question.parts[*index].options.clone();
    part.answer = apply_to_widget(part.kind, &options, part.answer.clone(), inner)?;
    part.options = options;
    Ok(AnswerValue::Parts(parts))
}

fn check_option(options: &[String], option: &str) -> Result<(), EditError> {
    if options.iter().any(|o| o == option) {
        Ok(())
    } else {
        Err(EditError::UnknownOption(option.to_string()))
    }
}

/// Keep a selection in the order the options appear on the page.
fn in_option_order(options: &[String], selected: &[String]) -> Vec<String> {
    options
        .iter()
        .filter(|o| selected.contains(o))
        .cloned()
        .collect()
}

fn apply_to_widget(
    kind: AnswerType,
    options: &[String],
    current: AnswerValue,
    edit: &Edit,
) -> Result<AnswerValue, EditError> {
    match (kind, edit) {
        (AnswerType::Text | AnswerType::RichText, Edit::SetText { value }) => {
            Ok(AnswerValue::Text(value.clone()))
        }
        (AnswerType::Multichoice, Edit::Toggle { option }) => {
            check_option(options, option)?;
            let mut selected = current.as_choices().map(<[String]>::to_vec).unwrap_or_default();
            if let Some(pos) = selected.iter().position(|s| s == option) {
                selected.remove(pos);
            } else {
                selected.push(option.clone());
            }
            Ok(AnswerValue::Choices(in_option_order(options, &selected)))
        }
        (AnswerType::Multichoice, Edit::SetChoices { options: chosen }) => {
            for option in chosen {
                check_option(options, option)?;
            }
            Ok(AnswerValue::Choices(in_option_order(options, chosen)))
        }
        (AnswerType::Button, Edit::Select { option }) => {
            check_option(options, option)?;
            Ok(AnswerValue::Text(option.clone()))
        }
        _ => Err(EditError::WrongType {
            edit: edit.name(),
            kind,
        }),
    }
}
