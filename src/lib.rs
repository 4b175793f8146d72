pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::AppConfig;

pub use adapters::{ConsoleRenderer, HttpQuoteSource, JsonFileStore, MemoryStore};
pub use app::quote_app::QuoteApp;
pub use crate::core::{
    display::QuoteDisplay,
    filter::CategoryFilter,
    store::{QuoteStore, SharedStore},
    sync::{reconcile, ReconcileReport, SyncEngine, SyncHandle, SyncOutcome, SyncTask},
};
pub use domain::conflict::{ConfirmWith, ConflictPolicy, KeepLocal, RemoteWins};
pub use domain::model::{CategorySelection, DisplayState, Quote};
pub use utils::error::{QuoteError, Result};
