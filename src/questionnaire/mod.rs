//! Assessment side of the page adapter: section expansion, question
//! scraping, and reading/writing answers through the form's own widgets.

pub mod answer;
pub mod classify;
pub mod model;
mod probe;
pub mod scrape;
pub mod scroll;

pub use classify::{classify, Classification, Markers};
pub use model::{Answer, AnswerType, AnswerValue, Part, PartSpec, Question, Section};
