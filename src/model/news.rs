//! News feed items and the last-good cache

use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u32,
    pub title: String,
    /// Local wall-clock time the item was produced, as text
    pub time: String,
}

/// Feed state shown by the news view.
///
/// A failed refresh keeps the previous items and records the error next to them.
#[derive(Debug, Default)]
pub struct NewsFeed {
    items: Vec<NewsItem>,
    pub error: Option<String>,
    pub refreshing: bool,
    last_success: Option<Instant>,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    /// Whether items on screen come from an earlier successful fetch
    pub fn is_stale(&self) -> bool {
        self.error.is_some() && !self.items.is_empty()
    }

    pub fn apply(&mut self, result: Result<Vec<NewsItem>, String>) {
        self.refreshing = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                self.last_success = Some(Instant::now());
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32) -> NewsItem {
        NewsItem {
            id,
            title: format!("Breaking News #{}", id),
            time: "10:00:00".to_string(),
        }
    }

    #[test]
    fn test_failure_keeps_last_good_items() {
        let mut feed = NewsFeed::new();
        feed.apply(Ok(vec![item(7)]));
        feed.apply(Err("Random API failure".to_string()));

        assert_eq!(feed.items(), &[item(7)]);
        assert!(feed.is_stale());
    }

    #[test]
    fn test_success_clears_error() {
        let mut feed = NewsFeed::new();
        feed.apply(Err("boom".to_string()));
        assert!(!feed.is_stale());
        feed.apply(Ok(vec![item(1)]));
        assert!(feed.error.is_none());
        assert!(feed.last_success().is_some());
    }
}
