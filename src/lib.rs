// rmcp's #[tool] macros generate code that calls these functions,
// but rustc/clippy can't trace through the macro-generated dispatching.
#![allow(dead_code)]

pub mod adapter;
pub mod browser;
pub mod config;
pub mod error;
pub mod interaction;
pub mod panel;
pub mod questionnaire;
pub mod relay;
pub mod server;
pub mod sheets;

pub use adapter::PageAdapter;
pub use config::AdapterConfig;
