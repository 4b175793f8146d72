pub mod display;
pub mod filter;
pub mod store;
pub mod sync;

pub use crate::domain::model::{CategorySelection, DisplayState, Quote};
pub use crate::domain::ports::{Clock, KeyValueStore, RemoteQuoteSource, Renderer};
pub use crate::utils::error::Result;
