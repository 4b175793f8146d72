use crate::utils::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    /// 建立前先 trim，兩個欄位都不可為空
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::validation(
                "both quote text and category are required",
            ));
        }

        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Seed data and sync results skip validation.
    pub fn trusted(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (Category: {})", self.text, self.category)
    }
}

/// 預設名言，儲存區沒有可用資料時使用
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::trusted(
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        Quote::trusted(
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        Quote::trusted(
            "You only live once, but if you do it right, once is enough.",
            "Wisdom",
        ),
    ]
}

/// 目前選取的分類，`All` 代表不過濾
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Category(String),
}

impl CategorySelection {
    pub const ALL: &'static str = "all";

    /// 只有小寫 `all` 與空字串代表不過濾，`All` 等仍是一般分類
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == Self::ALL {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Category(name) => name,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category == *name,
        }
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 顯示結果：一則名言，或「此分類沒有名言」
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Quote(Quote),
    NoQuotesInCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_new_trims_fields() {
        let quote = Quote::new("  Stay hungry.  ", " Life ").unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Life");
    }

    #[test]
    fn test_quote_new_rejects_blank_fields() {
        assert!(matches!(
            Quote::new("", "x"),
            Err(QuoteError::ValidationError { .. })
        ));
        assert!(matches!(
            Quote::new("x", "   "),
            Err(QuoteError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_category_selection_parse() {
        assert_eq!(CategorySelection::parse("all"), CategorySelection::All);
        assert_eq!(CategorySelection::parse(""), CategorySelection::All);
        assert_eq!(
            CategorySelection::parse("Life"),
            CategorySelection::Category("Life".to_string())
        );
    }

    #[test]
    fn test_category_named_all_is_selectable() {
        let selection = CategorySelection::parse("All");
        assert_eq!(selection, CategorySelection::Category("All".to_string()));
        assert!(selection.matches(&Quote::trusted("x", "All")));
        assert!(!selection.matches(&Quote::trusted("x", "Life")));
    }

    #[test]
    fn test_quote_serializes_with_plain_field_names() {
        let json = serde_json::to_value(Quote::trusted("A", "c1")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "A", "category": "c1"}));
    }
}
