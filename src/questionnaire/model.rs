use serde::{Deserialize, Serialize};

/// How a question takes its answer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
pub enum AnswerType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "richtext")]
    RichText,
    #[serde(rename = "multichoice")]
    Multichoice,
    #[serde(rename = "button")]
    Button,
    #[serde(rename = "composed")]
    Composed,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

/// The value of an answer. Text and rich text carry a string, a single
/// button choice carries its label, a multi-select carries the selected
/// labels, and a composed question carries one typed part per widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Choices(Vec<String>),
    Parts(Vec<Part>),
}

impl AnswerValue {
    pub fn empty(kind: AnswerType) -> Self {
        match kind {
            AnswerType::Multichoice => AnswerValue::Choices(Vec::new()),
            AnswerType::Composed => AnswerValue::Parts(Vec::new()),
            _ => AnswerValue::Text(String::new()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Choices(c) => Some(c),
            _ => None,
        }
    }

    /// Parts of a composed answer. An empty list deserializes as `Choices`,
    /// so that reads as no parts too.
    pub fn as_parts(&self) -> Option<&[Part]> {
        match self {
            AnswerValue::Parts(p) => Some(p),
            AnswerValue::Choices(c) if c.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Part {
    #[serde(rename = "type")]
    pub kind: AnswerType,
    pub answer: AnswerValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// What a grab returns: the value plus, for choice widgets, every label on
/// offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Answer {
    pub answer: AnswerValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Answer {
    pub fn empty(kind: AnswerType) -> Self {
        Self {
            answer: AnswerValue::empty(kind),
            options: Vec::new(),
        }
    }
}

/// One widget of a composed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartSpec {
    #[serde(rename = "type")]
    pub kind: AnswerType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A scraped question. Matched back to the page by its exact trimmed text;
/// when two questions share a text the first on the page wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub question_number: String,
    #[serde(default)]
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<PartSpec>,
    #[serde(default, alias = "sectionId")]
    pub section_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<AnswerValue>,
}

impl Question {
    pub fn new(text: impl Into<String>, answer_type: AnswerType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            question_text: text.into(),
            question_number: String::new(),
            answer_type,
            options: Vec::new(),
            parts: Vec::new(),
            section_index: 0,
            answer: None,
            user_answer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_name: String,
    pub section_id: usize,
    pub questions: Vec<Question>,
}
