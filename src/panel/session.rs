use crate::questionnaire::{Question, Section};

/// One scrape's worth of panel state: the sections as returned and a flat
/// copy of their questions for editing. Replaced by the next scrape.
#[derive(Debug, Clone)]
pub struct PanelSession {
    sections: Vec<Section>,
    questions: Vec<Question>,
}

impl PanelSession {
    pub fn new(sections: Vec<Section>) -> Self {
        let questions = sections
            .iter()
            .flat_map(|s| s.questions.iter().cloned())
            .collect();
        Self {
            sections,
            questions,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_mut(&mut self, id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    /// First question with this exact trimmed text, mirroring how the page
    /// side resolves duplicates.
    pub fn find_by_text(&self, text: &str) -> Option<&Question> {
        let text = text.trim();
        self.questions.iter().find(|q| q.question_text.trim() == text)
    }
}
