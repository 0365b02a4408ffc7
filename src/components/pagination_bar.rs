//! Pagination bar
//!
//! Previous/Next plus either a page counter (simple theme) or numbered
//! page buttons with ellipsis (numbered theme).

use crate::model::pagination::{page_items, PageItem, PaginationTheme};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the bar needs to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub theme: PaginationTheme,
    pub page_index: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub loading: bool,
}

fn control(label: &str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(label.to_string(), style)
}

/// Build the bar's single line
pub fn pagination_line(view: &PaginationView) -> Line<'static> {
    let total = view.total_pages.max(1);
    let current = view.page_index.min(total - 1);
    let mut spans = vec![control("◀ Prev", current > 0), Span::raw("  ")];

    match view.theme {
        PaginationTheme::Simple => {
            spans.push(Span::styled(
                format!("Page {} of {}", current + 1, total),
                Style::default().fg(Color::White),
            ));
        }
        PaginationTheme::Numbered => {
            for item in page_items(current, total) {
                match item {
                    PageItem::Page(page) if page == current => spans.push(Span::styled(
                        format!("[{}]", page + 1),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )),
                    PageItem::Page(page) => spans.push(Span::raw(format!(" {} ", page + 1))),
                    PageItem::Ellipsis => {
                        spans.push(Span::styled(" … ", Style::default().fg(Color::DarkGray)))
                    }
                }
            }
        }
    }

    spans.push(Span::raw("  "));
    spans.push(control("Next ▶", current + 1 < total));
    spans.push(Span::styled(
        format!("   {} rows · {} per page", view.total_count, view.page_size),
        Style::default().fg(Color::DarkGray),
    ));
    if view.loading {
        spans.push(Span::styled("   loading…", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

pub fn draw_pagination_bar(frame: &mut Frame, area: Rect, view: &PaginationView) {
    let paragraph = Paragraph::new(pagination_line(view)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn view(theme: PaginationTheme, page_index: usize, total_pages: usize) -> PaginationView {
        PaginationView {
            theme,
            page_index,
            total_pages,
            page_size: 10,
            total_count: total_pages * 10,
            loading: false,
        }
    }

    #[test]
    fn test_simple_theme_counter() {
        let line = pagination_line(&view(PaginationTheme::Simple, 1, 3));
        assert!(text(&line).contains("Page 2 of 3"));
    }

    #[test]
    fn test_numbered_theme_collapses_with_ellipsis() {
        let line = pagination_line(&view(PaginationTheme::Numbered, 4, 10));
        let rendered = text(&line);
        assert!(rendered.contains(" 1 "));
        assert!(rendered.contains("[5]"));
        assert!(rendered.contains(" 10 "));
        assert_eq!(rendered.matches('…').count(), 2);
    }

    #[test]
    fn test_prev_disabled_on_first_page() {
        let line = pagination_line(&view(PaginationTheme::Simple, 0, 2));
        assert_eq!(line.spans[0].style.fg, Some(Color::DarkGray));
        let next = line.spans.iter().find(|s| s.content == "Next ▶").unwrap();
        assert_eq!(next.style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_empty_table_shows_one_page() {
        let line = pagination_line(&view(PaginationTheme::Simple, 0, 0));
        assert!(text(&line).contains("Page 1 of 1"));
    }
}
