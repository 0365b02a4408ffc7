//! Menu dialog component
//!
//! A small list popup used for row actions, bulk actions, export formats
//! and column visibility. The cursor lives in the modal; the App pushes the
//! entries and cursor in before drawing.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Checkbox state for toggle lists, None for plain entries
    pub checked: Option<bool>,
    pub destructive: bool,
}

impl MenuItem {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: None,
            destructive: false,
        }
    }

    pub fn toggle(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked: Some(checked),
            destructive: false,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// List menu popup
pub struct MenuDialog {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub selected_index: usize,
    list_state: ListState,
}

impl Default for MenuDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuDialog {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            items: Vec::new(),
            selected_index: 0,
            list_state: ListState::default(),
        }
    }

    /// Replace the entries and cursor shown by the next draw
    pub fn set_menu(&mut self, title: &str, items: Vec<MenuItem>, selected_index: usize) {
        self.title = title.to_string();
        self.selected_index = selected_index.min(items.len().saturating_sub(1));
        self.items = items;
        self.list_state.select(Some(self.selected_index));
    }

    /// Toggle lists stay open on Enter
    fn is_toggle_list(&self) -> bool {
        self.items.iter().any(|i| i.checked.is_some())
    }
}

impl Component for MenuDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Char(' ') if self.is_toggle_list() => Some(Action::ConfirmModal),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ModalUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ModalDown),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let widest = self
            .items
            .iter()
            .map(|i| i.label.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let popup_width = (widest + 12).clamp(32, area.width.saturating_sub(4).max(32));
        let popup_height = self.items.len() as u16 + 5;
        let popup_area = centered_popup(area, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(popup_area);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let mut spans = Vec::new();
                if let Some(checked) = item.checked {
                    spans.push(Span::styled(
                        if checked { "[x] " } else { "[ ] " },
                        Style::default().fg(Color::Green),
                    ));
                }
                let style = if item.destructive {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::styled(item.label.clone(), style));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!(" {} ", self.title))
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let confirm = if self.is_toggle_list() { "Toggle" } else { "Select" };
        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}  ", confirm)),
            Span::styled(" j/k ", Style::default().fg(Color::Cyan)),
            Span::raw("Navigate  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Close"),
        ]))
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
        frame.render_widget(help, chunks[1]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_set_menu_clamps_cursor() {
        let mut dialog = MenuDialog::new();
        dialog.set_menu("Actions", vec![MenuItem::plain("Edit"), MenuItem::plain("Delete")], 7);
        assert_eq!(dialog.selected_index, 1);
    }

    #[test]
    fn test_space_only_toggles_checkbox_lists() {
        let mut dialog = MenuDialog::new();
        dialog.set_menu("Export", vec![MenuItem::plain("CSV")], 0);
        assert_eq!(dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap(), None);

        dialog.set_menu("Columns", vec![MenuItem::toggle("Name", true)], 0);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap(),
            Some(Action::ConfirmModal)
        );
    }

    #[test]
    fn test_navigation_keys() {
        let mut dialog = MenuDialog::new();
        assert_eq!(dialog.handle_key_event(key(KeyCode::Char('j'))).unwrap(), Some(Action::ModalDown));
        assert_eq!(dialog.handle_key_event(key(KeyCode::Up)).unwrap(), Some(Action::ModalUp));
        assert_eq!(dialog.handle_key_event(key(KeyCode::Esc)).unwrap(), Some(Action::CloseModal));
    }
}
