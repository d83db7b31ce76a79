pub mod discovery;
pub mod launch;
pub mod session;

pub use discovery::discover_work_items;
pub use launch::launch_browser;
pub use session::{ChromeLauncher, ChromeSession, ChromeTab};
