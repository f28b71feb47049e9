pub mod eval;
pub mod events;
pub mod wait;

pub use eval::evaluate;
pub use wait::{poll_until, PollOutcome, PollPolicy};
