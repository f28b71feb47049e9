use serde::Deserialize;

use super::model::AnswerType;

/// Which answer widgets a question container holds, as counted by the page
/// probe. Pure data so classification can be checked without a browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markers {
    pub multichoice_widget: bool,
    pub multichoice_options: usize,
    pub button_rows: usize,
    /// Button rows that sit inside the multi-select widget itself.
    pub nested_button_rows: usize,
    pub text_input: bool,
    pub rich_text: bool,
}

struct Rule {
    kind: AnswerType,
    matches: fn(&Markers) -> bool,
}

fn has_multichoice(m: &Markers) -> bool {
    m.multichoice_widget && m.multichoice_options > 0
}

fn has_button_row(m: &Markers) -> bool {
    m.button_rows > m.nested_button_rows
}

fn has_text_input(m: &Markers) -> bool {
    m.text_input
}

fn has_rich_text(m: &Markers) -> bool {
    m.rich_text
}

/// Evaluated top to bottom; the order is also the order of a composed
/// question's parts. An empty multi-select does not count, and buttons
/// belonging to a multi-select do not make a button row.
const RULES: [Rule; 4] = [
    Rule {
        kind: AnswerType::Multichoice,
        matches: has_multichoice,
    },
    Rule {
        kind: AnswerType::Button,
        matches: has_button_row,
    },
    Rule {
        kind: AnswerType::Text,
        matches: has_text_input,
    },
    Rule {
        kind: AnswerType::RichText,
        matches: has_rich_text,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub answer_type: AnswerType,
    /// The matched widget types, populated only for composed questions.
    pub parts: Vec<AnswerType>,
}

pub fn classify(markers: &Markers) -> Classification {
    let matched: Vec<AnswerType> = RULES
        .iter()
        .filter(|rule| (rule.matches)(markers))
        .map(|rule| rule.kind)
        .collect();

    match matched.as_slice() {
        [] => Classification {
            answer_type: AnswerType::Unknown,
            parts: Vec::new(),
        },
        [single] => Classification {
            answer_type: *single,
            parts: Vec::new(),
        },
        _ => Classification {
            answer_type: AnswerType::Composed,
            parts: matched,
        },
    }
}
