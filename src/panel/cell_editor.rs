use serde_json::Value;

/// The selected cell's content as the panel edits it: structured when the
/// cell holds valid JSON, free rich text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Json(Value),
    RichText(String),
}

impl CellContent {
    pub fn detect(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => CellContent::Json(value),
            Err(_) => CellContent::RichText(raw.to_string()),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, CellContent::Json(_))
    }

    /// The text written back into the cell.
    pub fn to_saved(&self) -> String {
        match self {
            CellContent::Json(value) => value.to_string(),
            CellContent::RichText(text) => prepare_for_save(text),
        }
    }
}

/// Cells are single-line: drop line breaks, then compact the result if it
/// turned out to be JSON.
pub fn prepare_for_save(content: &str) -> String {
    let flat: String = content.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    match serde_json::from_str::<Value>(&flat) {
        Ok(value) => value.to_string(),
        Err(_) => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect() {
        assert_eq!(
            CellContent::detect(r#"{"a": [1, 2]}"#),
            CellContent::Json(json!({ "a": [1, 2] }))
        );
        assert!(CellContent::detect("42").is_json());
        assert_eq!(
            CellContent::detect("<p>Hello</p>"),
            CellContent::RichText("<p>Hello</p>".into())
        );
        assert!(!CellContent::detect("").is_json());
    }

    #[test]
    fn test_prepare_for_save_strips_breaks() {
        assert_eq!(prepare_for_save("line one\r\nline two\n"), "line oneline two");
    }

    #[test]
    fn test_prepare_for_save_compacts_json() {
        assert_eq!(prepare_for_save("{\n  \"a\": 1,\n  \"b\": [true]\n}"), r#"{"a":1,"b":[true]}"#);
    }

    #[test]
    fn test_json_saves_compact() {
        let content = CellContent::Json(json!({ "k": "v" }));
        assert_eq!(content.to_saved(), r#"{"k":"v"}"#);
    }
}
