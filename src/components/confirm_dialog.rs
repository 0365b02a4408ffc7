//! Yes/No confirmation dialog component
//!
//! Shared by the quit prompt and delete confirmations.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Confirmation dialog
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    /// Label of the confirming choice
    pub confirm_label: String,
    /// Destructive prompts draw in red
    pub destructive: bool,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::quit()
    }
}

impl ConfirmDialog {
    pub fn quit() -> Self {
        Self {
            title: "Quit?".to_string(),
            message: "Are you sure you want to quit?".to_string(),
            confirm_label: "Yes, quit".to_string(),
            destructive: false,
        }
    }

    /// Prompt for deleting `count` users
    pub fn delete(count: usize) -> Self {
        let message = if count == 1 {
            "Delete this user? This cannot be undone.".to_string()
        } else {
            format!("Delete {} selected users? This cannot be undone.", count)
        };
        Self {
            title: "Delete".to_string(),
            message,
            confirm_label: "Yes, delete".to_string(),
            destructive: true,
        }
    }

    fn accent(&self) -> Color {
        if self.destructive {
            Color::Red
        } else {
            Color::Yellow
        }
    }
}

impl Component for ConfirmDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let width = (self.message.chars().count() as u16 + 6).clamp(40, 64);
        let popup_area = centered_popup(area, width, 8);

        frame.render_widget(Clear, popup_area);

        let accent = self.accent();
        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    " y ",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{}  ", self.confirm_label)),
                Span::styled(
                    " n/Esc ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw("No, cancel"),
            ]),
        ];

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent))
                    .title(format!(" {} ", self.title))
                    .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_keys_map_to_confirm_and_close() {
        let mut dialog = ConfirmDialog::quit();
        let yes = dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(yes, Some(Action::ConfirmModal));
        let no = dialog
            .handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(no, Some(Action::CloseModal));
    }

    #[test]
    fn test_delete_message_counts_rows() {
        assert!(ConfirmDialog::delete(1).message.starts_with("Delete this user"));
        assert!(ConfirmDialog::delete(3).message.contains("3 selected users"));
        assert!(ConfirmDialog::delete(3).destructive);
    }
}
