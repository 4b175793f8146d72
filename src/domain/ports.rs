use crate::domain::model::Quote;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Key-value storage (durable or session scoped). Values are opaque strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Display surface for quotes and non-blocking notices.
pub trait Renderer: Send + Sync {
    fn render_quote(&self, quote: &Quote);
    fn render_empty(&self, category: &str);
    fn notify(&self, message: &str);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Remote quote server.
#[async_trait]
pub trait RemoteQuoteSource: Send + Sync {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;
    async fn publish(&self, quote: &Quote) -> Result<()>;
}
