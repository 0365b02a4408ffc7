//! Counter view over the App-owned counter

use crate::action::Action;
use crate::component::Component;
use crate::model::counter::Counter;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Amount added by the "add" button
pub const ADD_AMOUNT: i64 = 5;

#[derive(Default)]
pub struct CounterView;

impl Component for CounterView {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Increment),
            KeyCode::Char('-') => Some(Action::Decrement),
            KeyCode::Enter => Some(Action::AddBy(ADD_AMOUNT)),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the counter, so we use draw_with_counter
        Ok(())
    }
}

impl CounterView {
    pub fn draw_with_counter(&self, frame: &mut Frame, area: Rect, counter: &Counter) -> Result<()> {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                counter.value.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(" + ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw("Increment  "),
                Span::styled(" - ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw("Decrement  "),
                Span::styled(" Enter ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(format!("Add {}", ADD_AMOUNT)),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Counter ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(paragraph, area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let mut view = CounterView;
        let press = |view: &mut CounterView, code| view.handle_key_event(KeyEvent::from(code)).unwrap();
        assert_eq!(press(&mut view, KeyCode::Char('+')), Some(Action::Increment));
        assert_eq!(press(&mut view, KeyCode::Char('-')), Some(Action::Decrement));
        assert_eq!(press(&mut view, KeyCode::Enter), Some(Action::AddBy(5)));
    }
}
