use crate::core::display::QuoteDisplay;
use crate::core::filter::{categories_of, show_filtered, CategoryFilter};
use crate::core::store::SharedStore;
use crate::core::sync::{SyncEngine, SyncHandle, SyncOutcome, SyncTask};
use crate::domain::model::{CategorySelection, DisplayState, Quote};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// 把名言集合、顯示、分類過濾與同步接在一起
pub struct QuoteApp<S, V>
where
    S: KeyValueStore + Clone + 'static,
    V: KeyValueStore,
{
    store: SharedStore<S>,
    display: QuoteDisplay<V>,
    filter: CategoryFilter<S>,
    sync: Arc<SyncEngine<S>>,
    selection: CategorySelection,
    publish_new_quotes: bool,
    publishes: Mutex<JoinSet<()>>,
}

impl<S, V> QuoteApp<S, V>
where
    S: KeyValueStore + Clone + 'static,
    V: KeyValueStore,
{
    pub async fn new(
        store: SharedStore<S>,
        display: QuoteDisplay<V>,
        sync: Arc<SyncEngine<S>>,
    ) -> Self {
        let durable = store.lock().await.storage().clone();
        Self {
            store,
            display,
            filter: CategoryFilter::new(durable),
            sync,
            selection: CategorySelection::All,
            publish_new_quotes: false,
            publishes: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_publishing(mut self, enabled: bool) -> Self {
        self.publish_new_quotes = enabled;
        self
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    /// 啟動：還原分類；session 有上次看過的名言就顯示它，否則依分類隨機顯示
    pub async fn start(&mut self) -> Result<DisplayState> {
        self.selection = self.filter.get_selected().await?;

        if let Some(quote) = self.display.restore_last_viewed().await? {
            self.display.render(&quote).await?;
            return Ok(DisplayState::Quote(quote));
        }

        self.next().await
    }

    pub async fn next(&self) -> Result<DisplayState> {
        let quotes = self.snapshot().await;
        show_filtered(&self.display, &quotes, &self.selection).await
    }

    /// 只顯示一次，不改變保存的分類
    pub async fn show_in(&self, category: &str) -> Result<DisplayState> {
        let quotes = self.snapshot().await;
        show_filtered(&self.display, &quotes, &CategorySelection::parse(category)).await
    }

    /// 從完整集合隨機顯示，忽略分類
    pub async fn show_random(&self) -> Result<Quote> {
        let quotes = self.snapshot().await;
        self.display.show_random(&quotes).await
    }

    pub async fn add(&self, text: &str, category: &str) -> Result<Quote> {
        let quote = self.store.lock().await.add(text, category).await?;
        self.display
            .renderer()
            .notify("New quote added successfully!");

        if self.publish_new_quotes {
            let sync = self.sync.clone();
            let published = quote.clone();
            self.publishes.lock().await.spawn(async move {
                sync.publish(&published).await;
            });
        }

        Ok(quote)
    }

    /// 等待背景送出的名言完成（結束程式前呼叫）
    pub async fn finish_publishing(&self) {
        let mut publishes = self.publishes.lock().await;
        while let Some(result) = publishes.join_next().await {
            if let Err(e) = result {
                tracing::warn!("⚠️ Publish task ended abnormally: {}", e);
            }
        }
    }

    pub async fn select_category(&mut self, category: &str) -> Result<DisplayState> {
        self.selection = CategorySelection::parse(category);
        self.filter.set_selected(&self.selection).await?;
        self.next().await
    }

    pub async fn categories(&self) -> Vec<String> {
        categories_of(&self.snapshot().await)
    }

    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.store.lock().await.export_to_file(dir).await
    }

    pub async fn import(&self, path: impl AsRef<Path>) -> Result<usize> {
        let count = self.store.lock().await.import_file(path).await?;
        self.display
            .renderer()
            .notify(&format!("{} quotes imported successfully!", count));
        Ok(count)
    }

    pub async fn sync_now(&self) -> Result<SyncOutcome> {
        self.sync.sync_once().await
    }

    pub fn start_sync(&self, interval: Duration) -> SyncHandle {
        SyncTask::start(self.sync.clone(), interval)
    }

    async fn snapshot(&self) -> Vec<Quote> {
        self.store.lock().await.quotes().to_vec()
    }
}
