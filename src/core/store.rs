use crate::core::sync::{reconcile, ReconcileReport};
use crate::domain::conflict::ConflictPolicy;
use crate::domain::model::{seed_quotes, Quote};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::{QuoteError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const QUOTES_KEY: &str = "quotes";
pub const LAST_SYNC_KEY: &str = "lastSyncAt";
pub const EXPORT_FILENAME: &str = "quotes.json";

/// 讀取、計算、寫回全程持鎖，避免手動新增與同步合併互相覆蓋
pub type SharedStore<S> = Arc<Mutex<QuoteStore<S>>>;

/// 名言集合，唯一的資料來源；每次變更都整份寫回持久儲存
pub struct QuoteStore<S: KeyValueStore> {
    storage: S,
    quotes: Vec<Quote>,
    version: u64,
}

impl<S: KeyValueStore> QuoteStore<S> {
    /// 從持久儲存載入；沒有資料或無法解析時使用預設名言
    pub async fn load(storage: S) -> Result<Self> {
        let quotes = match storage.get(QUOTES_KEY).await? {
            Some(raw) => match serde_json::from_str::<Vec<Quote>>(&raw) {
                Ok(quotes) => {
                    tracing::debug!("Loaded {} quotes from storage", quotes.len());
                    quotes
                }
                Err(e) => {
                    tracing::warn!("⚠️ Stored quotes are unreadable ({}), using seed quotes", e);
                    seed_quotes()
                }
            },
            None => {
                tracing::debug!("No stored quotes, using seed quotes");
                seed_quotes()
            }
        };

        Ok(Self {
            storage,
            quotes,
            version: 0,
        })
    }

    pub fn into_shared(self) -> SharedStore<S> {
        Arc::new(Mutex::new(self))
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// 每次變更 +1
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn save(&self) -> Result<()> {
        self.persist(&self.quotes).await?;
        tracing::debug!("Saved {} quotes (version {})", self.quotes.len(), self.version);
        Ok(())
    }

    async fn persist(&self, quotes: &[Quote]) -> Result<()> {
        let json = serde_json::to_string(quotes)?;
        self.storage.set(QUOTES_KEY, &json).await
    }

    /// 先寫入新的集合，成功後才替換記憶體中的內容
    async fn commit(&mut self, next: Vec<Quote>, bump_version: bool) -> Result<()> {
        self.persist(&next).await?;
        self.quotes = next;
        if bump_version {
            self.version += 1;
        }
        Ok(())
    }

    pub async fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new(text, category)?;

        let mut next = self.quotes.clone();
        next.push(quote.clone());
        self.commit(next, true).await?;

        tracing::info!("➕ Added quote in category '{}'", quote.category);
        Ok(quote)
    }

    /// 匯入 JSON 陣列，全部附加在後（不去重）
    pub async fn import_batch(&mut self, raw_json: &str) -> Result<usize> {
        let imported = parse_quote_batch(raw_json)?;
        let count = imported.len();

        let mut next = self.quotes.clone();
        next.extend(imported);
        self.commit(next, true).await?;

        tracing::info!("📥 Imported {} quotes", count);
        Ok(count)
    }

    pub async fn import_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        self.import_batch(&raw).await
    }

    pub fn export_all(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.quotes)?)
    }

    /// 寫出 `<dir>/quotes.json`
    pub async fn export_to_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(EXPORT_FILENAME);
        tokio::fs::write(&path, self.export_all()?).await?;

        tracing::info!("📤 Exported {} quotes to {}", self.quotes.len(), path.display());
        Ok(path)
    }

    /// 合併遠端批次，整批處理完才寫回一次
    pub async fn merge_remote(
        &mut self,
        remote: Vec<Quote>,
        policy: &dyn ConflictPolicy,
    ) -> Result<ReconcileReport> {
        if remote.is_empty() {
            return Ok(ReconcileReport::default());
        }

        let mut next = self.quotes.clone();
        let report = reconcile(&mut next, remote, policy);
        self.commit(next, report.changed()).await?;

        Ok(report)
    }

    pub async fn record_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.storage.set(LAST_SYNC_KEY, &at.to_rfc3339()).await
    }

    pub async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.storage.get(LAST_SYNC_KEY).await? else {
            return Ok(None);
        };

        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable {} value: {}", LAST_SYNC_KEY, e);
                Ok(None)
            }
        }
    }
}

/// 驗證匯入內容：必須是陣列，每筆都有非空的 text 與 category
pub fn parse_quote_batch(raw_json: &str) -> Result<Vec<Quote>> {
    let value: serde_json::Value = serde_json::from_str(raw_json)?;

    let items = value
        .as_array()
        .ok_or_else(|| QuoteError::format("expected a JSON array of quotes"))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let text = item.get("text").and_then(|v| v.as_str()).unwrap_or_default();
            let category = item
                .get("category")
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            // 只檢查是否為空，內容原樣保留
            if text.trim().is_empty() || category.trim().is_empty() {
                return Err(QuoteError::format(format!(
                    "item {} must have non-empty \"text\" and \"category\"",
                    index
                )));
            }

            Ok(Quote::trusted(text, category))
        })
        .collect()
}
