pub mod extractor;
pub mod item_ctx;

pub use extractor::ItemExtractor;
pub use item_ctx::ItemCtx;
