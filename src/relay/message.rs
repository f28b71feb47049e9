use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::questionnaire::{Answer, Question, Section};
use crate::sheets::{parse_range, CellRef};

fn yes() -> bool {
    true
}

/// Every message the coordinator understands, keyed by its `action` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "getCurrentCellIndex")]
    GetCurrentCellIndex,
    #[serde(rename = "setCurrentCellIndex", rename_all = "camelCase")]
    SetCurrentCellIndex { cell_index: CellRef },
    #[serde(rename = "getCurrentCellValue")]
    GetCurrentCellValue,
    #[serde(rename = "getCellValue", rename_all = "camelCase")]
    GetCellValue {
        cell_index: CellRef,
        #[serde(default = "yes")]
        restore_selection: bool,
    },
    /// Without a `cellIndex` the currently selected cell is written.
    #[serde(rename = "setCellValue", rename_all = "camelCase")]
    SetCellValue {
        #[serde(default)]
        cell_index: Option<CellRef>,
        cell_value: String,
        #[serde(default = "yes")]
        preserve_selection: bool,
    },
    #[serde(rename = "getDropdownListByRange")]
    GetDropdownListByRange { range: String },
    #[serde(rename = "getSheetNames")]
    GetSheetNames,
    #[serde(rename = "sheetSelected", rename_all = "camelCase")]
    SheetSelected { sheet_name: String },
    #[serde(rename = "SCRAPE_SECTIONS")]
    ScrapeSections,
    #[serde(rename = "SCRAPE_SECTIONS_WITH_ANSWERS")]
    ScrapeSectionsWithAnswers,
    #[serde(rename = "GRAB_ANSWER")]
    GrabAnswer(Question),
    #[serde(rename = "PUSH_ANSWER")]
    PushAnswer(Question),
    #[serde(rename = "SCROLL_TO_QUESTION")]
    ScrollToQuestion(Question),
    /// Without a `range` this reports the current selection.
    #[serde(rename = "selectRange")]
    SelectRange {
        #[serde(default)]
        range: Option<String>,
    },
    #[serde(rename = "getSelectedRange")]
    GetSelectedRange,
    #[serde(rename = "getRangeValues")]
    GetRangeValues { range: String },
    #[serde(rename = "setRangeValues")]
    SetRangeValues {
        range: String,
        #[serde(default)]
        values: Option<Vec<Vec<String>>>,
    },
}

impl Request {
    /// Parse a raw panel message.
    pub fn from_message(message: serde_json::Value) -> Result<Self, RelayError> {
        serde_json::from_value(message).map_err(|e| RelayError::Malformed(e.to_string()))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::GetCurrentCellIndex => "getCurrentCellIndex",
            Request::SetCurrentCellIndex { .. } => "setCurrentCellIndex",
            Request::GetCurrentCellValue => "getCurrentCellValue",
            Request::GetCellValue { .. } => "getCellValue",
            Request::SetCellValue { .. } => "setCellValue",
            Request::GetDropdownListByRange { .. } => "getDropdownListByRange",
            Request::GetSheetNames => "getSheetNames",
            Request::SheetSelected { .. } => "sheetSelected",
            Request::ScrapeSections => "SCRAPE_SECTIONS",
            Request::ScrapeSectionsWithAnswers => "SCRAPE_SECTIONS_WITH_ANSWERS",
            Request::GrabAnswer(_) => "GRAB_ANSWER",
            Request::PushAnswer(_) => "PUSH_ANSWER",
            Request::ScrollToQuestion(_) => "SCROLL_TO_QUESTION",
            Request::SelectRange { .. } => "selectRange",
            Request::GetSelectedRange => "getSelectedRange",
            Request::GetRangeValues { .. } => "getRangeValues",
            Request::SetRangeValues { .. } => "setRangeValues",
        }
    }

    /// Range actions answer failures as `{ error }` rather than
    /// `{ success: false, error }`.
    pub fn is_range_action(&self) -> bool {
        matches!(
            self,
            Request::SelectRange { .. }
                | Request::GetSelectedRange
                | Request::GetRangeValues { .. }
                | Request::SetRangeValues { .. }
        )
    }

    /// Check the fields each action needs. Runs before any tab is touched.
    /// Range reads and writes covering more than `max_range_cells` cells are
    /// refused.
    pub fn validate(&self, max_range_cells: u64) -> Result<(), RelayError> {
        match self {
            Request::SelectRange { range: Some(range) } => {
                parse_range(range)?;
            }
            Request::GetRangeValues { range } => {
                parse_range(range)?.check_size(max_range_cells)?;
            }
            Request::SetRangeValues { range, values } => {
                parse_range(range)?.check_size(max_range_cells)?;
                if values.is_none() {
                    return Err(RelayError::MissingField("values"));
                }
            }
            Request::GrabAnswer(q) | Request::ScrollToQuestion(q) => {
                if q.question_text.trim().is_empty() {
                    return Err(RelayError::MissingField("questionText"));
                }
            }
            Request::PushAnswer(q) => {
                if q.question_text.trim().is_empty() {
                    return Err(RelayError::MissingField("questionText"));
                }
                if q.user_answer.is_none() {
                    return Err(RelayError::MissingField("userAnswer"));
                }
            }
            Request::SheetSelected { sheet_name } if sheet_name.trim().is_empty() => {
                return Err(RelayError::MissingField("sheetName"));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Replies sent back to the panel. The shape depends on the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    CellIndex {
        #[serde(rename = "cellIndex")]
        cell_index: String,
    },
    CellValue {
        #[serde(rename = "cellValue")]
        cell_value: String,
    },
    SheetNames {
        #[serde(rename = "sheetNames")]
        sheet_names: Vec<String>,
    },
    Options(Vec<String>),
    Sections(Vec<Section>),
    Answer(Answer),
    Range {
        range: String,
    },
    Values {
        values: Vec<Vec<String>>,
    },
    Status {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Status {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Response::Status {
            success: false,
            error: Some(error.into()),
        }
    }

    /// The error text, whichever failure shape carries it.
    pub fn error(&self) -> Option<&str> {
        match self {
            Response::Status {
                error: Some(error), ..
            }
            | Response::Error { error } => Some(error),
            _ => None,
        }
    }
}

impl From<RelayError> for Response {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Range(_) => Response::Error {
                error: err.to_string(),
            },
            other => Response::failed(other.to_string()),
        }
    }
}
