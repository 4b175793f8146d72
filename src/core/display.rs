use crate::domain::model::{DisplayState, Quote};
use crate::domain::ports::{KeyValueStore, Renderer};
use crate::utils::error::{QuoteError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

pub fn pick_random(quotes: &[Quote]) -> Result<&Quote> {
    pick_random_with(&mut rand::thread_rng(), quotes)
}

/// 空集合回傳 `EmptyCollectionError`
pub fn pick_random_with<'a, G: Rng + ?Sized>(rng: &mut G, quotes: &'a [Quote]) -> Result<&'a Quote> {
    quotes.choose(rng).ok_or(QuoteError::EmptyCollectionError)
}

/// 顯示名言，並把最後一次顯示的名言存到 session storage
pub struct QuoteDisplay<V: KeyValueStore> {
    renderer: Arc<dyn Renderer>,
    session: V,
}

impl<V: KeyValueStore> QuoteDisplay<V> {
    pub fn new(renderer: Arc<dyn Renderer>, session: V) -> Self {
        Self { renderer, session }
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    pub async fn render(&self, quote: &Quote) -> Result<()> {
        self.renderer.render_quote(quote);
        let snapshot = serde_json::to_string(quote)?;
        self.session.set(LAST_VIEWED_KEY, &snapshot).await
    }

    pub fn render_empty(&self, category: &str) {
        self.renderer.render_empty(category);
    }

    pub async fn show_random(&self, quotes: &[Quote]) -> Result<Quote> {
        let quote = pick_random(quotes)?.clone();
        self.render(&quote).await?;
        Ok(quote)
    }

    pub async fn restore_last_viewed(&self) -> Result<Option<Quote>> {
        let Some(raw) = self.session.get(LAST_VIEWED_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Quote>(&raw) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable {} snapshot: {}", LAST_VIEWED_KEY, e);
                Ok(None)
            }
        }
    }

    /// 有 session 快照就顯示快照，否則從完整集合隨機挑一則
    pub async fn start(&self, quotes: &[Quote]) -> Result<DisplayState> {
        if let Some(quote) = self.restore_last_viewed().await? {
            tracing::debug!("Restoring last viewed quote from session");
            self.render(&quote).await?;
            return Ok(DisplayState::Quote(quote));
        }

        let quote = self.show_random(quotes).await?;
        Ok(DisplayState::Quote(quote))
    }
}
