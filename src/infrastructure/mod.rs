pub mod js_executor;
pub mod page;

pub use js_executor::JsExecutor;
pub use page::{BrowserSession, PageCapability, SessionLauncher};
