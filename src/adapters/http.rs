use crate::domain::model::Quote;
use crate::domain::ports::RemoteQuoteSource;
use crate::utils::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 遠端名言來源：GET 清單，每筆的 `title` 變成名言文字
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: Client,
    endpoint: String,
    category: String,
    max_items: Option<usize>,
}

impl HttpQuoteSource {
    pub fn new(endpoint: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            category: category.into(),
            max_items: None,
        }
    }

    /// 在 client 層加上請求逾時
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_items(&self, items: Vec<serde_json::Value>) -> Vec<Quote> {
        let limit = self.max_items.unwrap_or(usize::MAX);
        let mut quotes = Vec::new();

        for item in items.into_iter().take(limit) {
            match item.get("title").and_then(|v| v.as_str()) {
                Some(title) if !title.trim().is_empty() => {
                    quotes.push(Quote::trusted(title, self.category.clone()))
                }
                _ => tracing::debug!("Skipping remote item without a title: {}", item),
            }
        }

        quotes
    }
}

#[async_trait]
impl RemoteQuoteSource for HttpQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        tracing::debug!("Fetching remote quotes from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        tracing::debug!("Remote response status: {}", response.status());

        if !response.status().is_success() {
            return Err(QuoteError::HttpStatusError {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let items: Vec<serde_json::Value> = response.json().await?;
        Ok(self.map_items(items))
    }

    async fn publish(&self, quote: &Quote) -> Result<()> {
        let payload = serde_json::json!({
            "title": quote.text,
            "body": quote.category,
            "userId": 1,
        });

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(QuoteError::HttpStatusError {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        tracing::debug!("Quote posted to server: {}", body);
        Ok(())
    }
}
