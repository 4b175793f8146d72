// Adapters layer: concrete implementations of the domain ports (storage, http, console).

pub mod console;
pub mod http;
pub mod storage;

pub use console::ConsoleRenderer;
pub use http::HttpQuoteSource;
pub use storage::{JsonFileStore, MemoryStore};
