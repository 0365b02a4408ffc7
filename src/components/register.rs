//! Registration form view
//!
//! Built at runtime from the registration schema served by the API.
//! Submission only validates locally.

use crate::action::Action;
use crate::component::Component;
use crate::model::schema::FormSchema;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use log::info;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::collections::HashMap;

#[derive(Default)]
pub struct RegisterForm {
    pub schema: Option<FormSchema>,
    /// Why the schema could not be loaded
    pub load_error: Option<String>,
    /// One input per schema field, in schema order
    pub inputs: Vec<String>,
    pub focus: usize,
    /// Field name to validation message
    pub errors: HashMap<String, String>,
    pub success: Option<String>,
}

impl RegisterForm {
    pub fn set_schema(&mut self, result: Result<FormSchema, String>) {
        match result {
            Ok(schema) => {
                self.inputs = vec![String::new(); schema.properties.len()];
                self.schema = Some(schema);
                self.load_error = None;
                self.focus = 0;
                self.errors.clear();
                self.success = None;
            }
            Err(message) => self.load_error = Some(message),
        }
    }

    fn field_names(&self) -> Vec<String> {
        self.schema
            .as_ref()
            .map(|s| s.properties.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    /// Current inputs keyed by field name
    pub fn values(&self) -> HashMap<String, String> {
        self.field_names()
            .into_iter()
            .zip(self.inputs.iter().cloned())
            .collect()
    }

    /// Validate against the schema; on success the form is reset
    pub fn submit(&mut self) -> bool {
        let Some(schema) = self.schema.as_ref() else {
            return false;
        };
        let values = self.values();
        self.errors = schema.validate(&values);
        if !self.errors.is_empty() {
            self.success = None;
            return false;
        }

        let who = values
            .get("username")
            .or_else(|| values.get("email"))
            .cloned()
            .unwrap_or_default();
        info!("registration form submitted for {}", who);
        self.success = Some(format!("Registered {}", who.trim()));
        for input in &mut self.inputs {
            input.clear();
        }
        self.focus = 0;
        true
    }

    fn focused_name(&self) -> Option<String> {
        self.field_names().get(self.focus).cloned()
    }
}

impl Component for RegisterForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.schema.is_none() {
            let action = match key.code {
                KeyCode::Char('r') => Some(Action::Refresh),
                _ => None,
            };
            return Ok(action);
        }

        let count = self.inputs.len().max(1);
        let action = match key.code {
            KeyCode::Enter => Some(Action::SubmitRegister),
            KeyCode::Down => {
                self.focus = (self.focus + 1) % count;
                None
            }
            KeyCode::Up => {
                self.focus = (self.focus + count - 1) % count;
                None
            }
            KeyCode::Backspace => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.pop();
                }
                if let Some(name) = self.focused_name() {
                    self.errors.remove(&name);
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.push(c);
                }
                if let Some(name) = self.focused_name() {
                    self.errors.remove(&name);
                }
                self.success = None;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action == Action::SubmitRegister {
            self.submit();
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let (title, lines) = match (&self.schema, &self.load_error) {
            (Some(schema), _) => (schema.title.clone(), self.form_lines(schema)),
            (None, Some(error)) => (
                "Register".to_string(),
                vec![
                    Line::from(Span::styled(
                        format!("⚠ Failed to load form: {}", error),
                        Style::default().fg(Color::Red),
                    )),
                    Line::from(Span::styled(
                        "Press r to retry",
                        Style::default().fg(Color::DarkGray),
                    )),
                ],
            ),
            (None, None) => (
                "Register".to_string(),
                vec![Line::from(Span::styled(
                    "Loading form...",
                    Style::default().fg(Color::DarkGray),
                ))],
            ),
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
        Ok(())
    }
}

impl RegisterForm {
    fn form_lines(&self, schema: &FormSchema) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from("")];

        for (i, (name, field)) in schema.properties.iter().enumerate() {
            let focused = i == self.focus;
            let marker = if schema.is_required(name) { " *" } else { "" };
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            lines.push(Line::from(Span::styled(
                format!("  {}{}", field.title, marker),
                label_style,
            )));

            let value = self.inputs.get(i).cloned().unwrap_or_default();
            let shown = if value.is_empty() {
                Span::styled(field.placeholder.clone(), Style::default().fg(Color::DarkGray))
            } else if field.ui.component == "password" {
                Span::styled("•".repeat(value.chars().count()), Style::default().fg(Color::White))
            } else {
                Span::styled(value, Style::default().fg(Color::White))
            };
            let mut spans = vec![Span::styled("  > ", Style::default().fg(Color::Cyan)), shown];
            if focused {
                spans.push(Span::raw("_"));
            }
            lines.push(Line::from(spans));

            if let Some(message) = self.errors.get(name) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", message),
                    Style::default().fg(Color::Red),
                )));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![
            Span::styled(
                format!(" Enter  {} ", schema.submit_label()),
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   ↑/↓ Field", Style::default().fg(Color::DarkGray)),
        ]));

        if let Some(ref success) = self.success {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  ✓ {}", success),
                Style::default().fg(Color::Green),
            )));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        let mut form = RegisterForm::default();
        form.set_schema(Ok(FormSchema::register()));
        form
    }

    fn type_text(form: &mut RegisterForm, text: &str) {
        for c in text.chars() {
            form.handle_key_event(KeyEvent::from(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_fields_follow_schema_order() {
        let form = form();
        let names: Vec<String> = form.values().into_keys().collect();
        assert_eq!(form.inputs.len(), 3);
        assert!(names.contains(&"password".to_string()));
    }

    #[test]
    fn test_submit_reports_per_field_errors() {
        let mut form = form();
        type_text(&mut form, "ab");
        assert!(!form.submit());
        assert_eq!(
            form.errors.get("username").map(String::as_str),
            Some("Username must be at least 3 characters")
        );
        assert_eq!(
            form.errors.get("email").map(String::as_str),
            Some("Email is required")
        );
    }

    #[test]
    fn test_valid_submit_resets_inputs() {
        let mut form = form();
        type_text(&mut form, "alice");
        form.handle_key_event(KeyEvent::from(KeyCode::Down)).unwrap();
        type_text(&mut form, "alice@example.com");
        form.handle_key_event(KeyEvent::from(KeyCode::Down)).unwrap();
        type_text(&mut form, "secret1");

        let action = form.handle_key_event(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert_eq!(action, Some(Action::SubmitRegister));
        form.update(Action::SubmitRegister).unwrap();

        assert!(form.errors.is_empty());
        assert_eq!(form.success.as_deref(), Some("Registered alice"));
        assert!(form.inputs.iter().all(String::is_empty));
    }

    #[test]
    fn test_load_failure_offers_retry() {
        let mut form = RegisterForm::default();
        form.set_schema(Err("connection refused".to_string()));
        let action = form.handle_key_event(KeyEvent::from(KeyCode::Char('r'))).unwrap();
        assert_eq!(action, Some(Action::Refresh));
    }
}
