//! News feed view
//!
//! Shows the latest items; after a failed refresh the error is shown above
//! the items from the last successful fetch.

use crate::action::Action;
use crate::component::Component;
use crate::model::news::NewsFeed;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// News tab
#[derive(Default)]
pub struct NewsView;

impl Component for NewsView {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the feed, so we use draw_with_feed
        Ok(())
    }
}

impl NewsView {
    pub fn draw_with_feed(
        &self,
        frame: &mut Frame,
        area: Rect,
        feed: &NewsFeed,
        refresh_secs: u64,
    ) -> Result<()> {
        let lines = news_lines(feed);
        let status = if feed.refreshing {
            " refreshing… ".to_string()
        } else {
            format!(" every {}s · r to refresh ", refresh_secs)
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" News ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .title_bottom(Line::from(Span::styled(
                    status,
                    Style::default().fg(Color::DarkGray),
                )))
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
        Ok(())
    }
}

fn news_lines(feed: &NewsFeed) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(ref error) = feed.error {
        lines.push(Line::from(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        if feed.is_stale() {
            lines.push(Line::from(Span::styled(
                "Showing cached items from the last successful refresh",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
    }

    if feed.items().is_empty() {
        let message = if feed.refreshing {
            "Loading..."
        } else {
            "No news yet."
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    for item in feed.items() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>8}  ", item.time), Style::default().fg(Color::DarkGray)),
            Span::styled(item.title.clone(), Style::default().fg(Color::White)),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::news::NewsItem;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_error_shown_above_cached_items() {
        let mut feed = NewsFeed::new();
        feed.apply(Ok(vec![NewsItem {
            id: 42,
            title: "Breaking News #42".to_string(),
            time: "10:15:00".to_string(),
        }]));
        feed.apply(Err("Random API failure".to_string()));

        let rendered = text(&news_lines(&feed));
        assert_eq!(rendered[0], "⚠ Random API failure");
        assert!(rendered.last().is_some_and(|l| l.contains("Breaking News #42")));
    }

    #[test]
    fn test_empty_feed_placeholder() {
        let feed = NewsFeed::new();
        assert_eq!(text(&news_lines(&feed)), vec!["No news yet."]);
    }
}
