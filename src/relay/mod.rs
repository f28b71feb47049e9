//! The coordinator between the panel and the page adapter: a fixed set of
//! actions, validated up front and forwarded to whichever tab is active.

pub mod coordinator;
pub mod message;

pub use coordinator::{Coordinator, RelayHandle};
pub use message::{Request, Response};
