use crate::core::display::{pick_random, QuoteDisplay};
use crate::domain::model::{CategorySelection, DisplayState, Quote};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use std::collections::HashSet;

pub const SELECTED_CATEGORY_KEY: &str = "lastSelectedCategory";
pub const LEGACY_SELECTED_CATEGORY_KEY: &str = "selectedCategory";

/// 不重複的分類，保留第一次出現的順序
pub fn categories_of(quotes: &[Quote]) -> Vec<String> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .filter(|q| seen.insert(q.category.as_str()))
        .map(|q| q.category.clone())
        .collect()
}

pub fn filter<'a>(quotes: &'a [Quote], selection: &CategorySelection) -> Vec<&'a Quote> {
    quotes.iter().filter(|q| selection.matches(q)).collect()
}

/// 依分類隨機顯示；過濾結果為空時顯示「沒有名言」狀態
pub async fn show_filtered<V: KeyValueStore>(
    display: &QuoteDisplay<V>,
    quotes: &[Quote],
    selection: &CategorySelection,
) -> Result<DisplayState> {
    let filtered: Vec<Quote> = filter(quotes, selection).into_iter().cloned().collect();

    if filtered.is_empty() {
        display.render_empty(selection.as_str());
        return Ok(DisplayState::NoQuotesInCategory(selection.to_string()));
    }

    let quote = pick_random(&filtered)?.clone();
    display.render(&quote).await?;
    Ok(DisplayState::Quote(quote))
}

/// 保存目前選取的分類（持久儲存）
pub struct CategoryFilter<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> CategoryFilter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn set_selected(&self, selection: &CategorySelection) -> Result<()> {
        let value = serde_json::to_string(selection.as_str())?;
        self.storage.set(SELECTED_CATEGORY_KEY, &value).await?;
        tracing::debug!("Selected category saved: {}", selection);
        Ok(())
    }

    pub async fn get_selected(&self) -> Result<CategorySelection> {
        let raw = match self.storage.get(SELECTED_CATEGORY_KEY).await? {
            Some(raw) => Some(raw),
            None => self.storage.get(LEGACY_SELECTED_CATEGORY_KEY).await?,
        };

        Ok(raw
            .map(|raw| decode_selection(&raw))
            .unwrap_or_default())
    }

    /// 還原上次選取的分類並顯示
    pub async fn start<V: KeyValueStore>(
        &self,
        display: &QuoteDisplay<V>,
        quotes: &[Quote],
    ) -> Result<(CategorySelection, DisplayState)> {
        let selection = self.get_selected().await?;
        let state = show_filtered(display, quotes, &selection).await?;
        Ok((selection, state))
    }
}

// 舊版直接存純文字
fn decode_selection(raw: &str) -> CategorySelection {
    match serde_json::from_str::<String>(raw) {
        Ok(value) => CategorySelection::parse(&value),
        Err(_) => CategorySelection::parse(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::core::display::tests::RecordingRenderer;
    use std::sync::Arc;

    fn quotes() -> Vec<Quote> {
        vec![
            Quote::trusted("t1", "X"),
            Quote::trusted("t2", "X"),
            Quote::trusted("t3", "Y"),
        ]
    }

    #[test]
    fn test_categories_of_distinct_first_seen() {
        assert_eq!(categories_of(&quotes()), vec!["X", "Y"]);

        let reversed: Vec<Quote> = quotes().into_iter().rev().collect();
        let categories: HashSet<String> = categories_of(&reversed).into_iter().collect();
        assert_eq!(
            categories,
            HashSet::from(["X".to_string(), "Y".to_string()])
        );
    }

    #[test]
    fn test_filter_all_returns_everything() {
        let quotes = quotes();
        let all = filter(&quotes, &CategorySelection::All);
        assert_eq!(all.len(), quotes.len());
        assert!(all.iter().zip(quotes.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_filter_by_category() {
        let quotes = quotes();
        let filtered = filter(&quotes, &CategorySelection::parse("Y"));
        assert_eq!(filtered, vec![&quotes[2]]);
        assert!(filter(&quotes, &CategorySelection::parse("Missing")).is_empty());
    }

    #[tokio::test]
    async fn test_show_filtered_missing_category_renders_empty_state() {
        let renderer = Arc::new(RecordingRenderer::default());
        let display = QuoteDisplay::new(renderer.clone(), MemoryStore::new());

        let state = show_filtered(&display, &quotes(), &CategorySelection::parse("Missing"))
            .await
            .unwrap();

        assert_eq!(state, DisplayState::NoQuotesInCategory("Missing".to_string()));
        assert_eq!(renderer.empty.lock().unwrap().as_slice(), &["Missing".to_string()]);
        assert!(renderer.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_filtered_only_picks_selected_category() {
        let display = QuoteDisplay::new(Arc::new(RecordingRenderer::default()), MemoryStore::new());

        for _ in 0..10 {
            let state = show_filtered(&display, &quotes(), &CategorySelection::parse("X"))
                .await
                .unwrap();
            let DisplayState::Quote(quote) = state else {
                panic!("expected a quote");
            };
            assert_eq!(quote.category, "X");
        }
    }

    #[tokio::test]
    async fn test_selection_persists_across_instances() {
        let storage = MemoryStore::new();
        let filter = CategoryFilter::new(storage.clone());
        assert_eq!(filter.get_selected().await.unwrap(), CategorySelection::All);

        filter
            .set_selected(&CategorySelection::parse("Life"))
            .await
            .unwrap();

        let restored = CategoryFilter::new(storage).get_selected().await.unwrap();
        assert_eq!(restored, CategorySelection::Category("Life".to_string()));
    }

    #[tokio::test]
    async fn test_legacy_plain_text_selection_is_read() {
        let storage = MemoryStore::new();
        storage
            .set(LEGACY_SELECTED_CATEGORY_KEY, "Wisdom")
            .await
            .unwrap();

        let selection = CategoryFilter::new(storage).get_selected().await.unwrap();
        assert_eq!(selection, CategorySelection::Category("Wisdom".to_string()));
    }

    #[tokio::test]
    async fn test_start_restores_and_renders() {
        let storage = MemoryStore::new();
        let filter = CategoryFilter::new(storage);
        filter.set_selected(&CategorySelection::parse("Y")).await.unwrap();
        let display = QuoteDisplay::new(Arc::new(RecordingRenderer::default()), MemoryStore::new());

        let (selection, state) = filter.start(&display, &quotes()).await.unwrap();

        assert_eq!(selection, CategorySelection::Category("Y".to_string()));
        assert_eq!(state, DisplayState::Quote(Quote::trusted("t3", "Y")));
    }
}
