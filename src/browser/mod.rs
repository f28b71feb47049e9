pub mod launcher;
pub mod navigation;
pub mod pool;
pub mod session;
pub mod tabs;

pub use pool::TabPool;
pub use session::BrowserSession;
