//! User form component
//!
//! Create and edit form for users. Validation runs locally before the
//! save is sent; server-side failures come back as the App's error.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::column::RowId;
use crate::model::user::{NewUser, User};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Form fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Phone,
    Address,
    City,
    Country,
    Language,
    Company,
    Avatar,
}

impl UserField {
    pub const ALL: [UserField; 9] = [
        UserField::Name,
        UserField::Email,
        UserField::Phone,
        UserField::Address,
        UserField::City,
        UserField::Country,
        UserField::Language,
        UserField::Company,
        UserField::Avatar,
    ];

    fn label(&self) -> &'static str {
        match self {
            UserField::Name => "Name",
            UserField::Email => "Email",
            UserField::Phone => "Phone",
            UserField::Address => "Address",
            UserField::City => "City",
            UserField::Country => "Country",
            UserField::Language => "Language",
            UserField::Company => "Company",
            UserField::Avatar => "Avatar URL",
        }
    }

    fn required(&self) -> bool {
        matches!(self, UserField::Name | UserField::Email)
    }
}

/// Create / edit user form
#[derive(Default)]
pub struct UserForm {
    /// Id of the user being edited, None when creating
    pub editing: Option<RowId>,
    /// One input per `UserField::ALL` entry
    pub inputs: Vec<String>,
    pub focus: usize,
    pub error: Option<String>,
}

impl UserForm {
    /// Empty form for a new user
    pub fn open_create(&mut self) {
        self.editing = None;
        self.inputs = vec![String::new(); UserField::ALL.len()];
        self.focus = 0;
        self.error = None;
    }

    /// Form pre-filled from an existing user
    pub fn open_edit(&mut self, user: &User) {
        self.open_create();
        self.editing = Some(user.id);
        let prefill = NewUser::from_user(user);
        for (i, field) in UserField::ALL.iter().enumerate() {
            let value = match field {
                UserField::Name => Some(prefill.name.clone()),
                UserField::Email => Some(prefill.email.clone()),
                UserField::Phone => prefill.phone.clone(),
                UserField::Address => prefill.address.clone(),
                UserField::City => prefill.city.clone(),
                UserField::Country => prefill.country.clone(),
                UserField::Language => prefill.language.clone(),
                UserField::Company => prefill.company.clone(),
                UserField::Avatar => prefill.avatar.clone(),
            };
            self.inputs[i] = value.unwrap_or_default();
        }
    }

    fn input(&self, field: UserField) -> &str {
        UserField::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.inputs.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    fn optional(&self, field: UserField) -> Option<String> {
        let value = self.input(field);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Payload built from the current inputs
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            name: self.input(UserField::Name).to_string(),
            email: self.input(UserField::Email).to_string(),
            phone: self.optional(UserField::Phone),
            address: self.optional(UserField::Address),
            country: self.optional(UserField::Country),
            avatar: self.optional(UserField::Avatar),
            language: self.optional(UserField::Language),
            city: self.optional(UserField::City),
            company: self.optional(UserField::Company),
        }
    }

    /// Validate and emit the save, or record the first problem
    pub fn submit(&mut self) -> Option<Action> {
        let user = self.to_new_user();
        match user.validate() {
            Ok(()) => {
                self.error = None;
                Some(Action::SaveUser {
                    editing: self.editing,
                    user,
                })
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % UserField::ALL.len();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + UserField::ALL.len() - 1) % UserField::ALL.len();
    }
}

impl Component for UserForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.clear();
                }
                None
            }
            KeyCode::Backspace => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.pop();
                }
                self.error = None;
                None
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.push(c);
                }
                self.error = None;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = UserField::ALL.len() as u16 + 8;
        let popup_area = centered_popup(area, 64, height);
        frame.render_widget(Clear, popup_area);

        let mut lines = vec![Line::from("")];
        for (i, field) in UserField::ALL.iter().enumerate() {
            let focused = i == self.focus;
            let marker = if field.required() { "*" } else { " " };
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            let value = self.inputs.get(i).map(String::as_str).unwrap_or("");
            let cursor = if focused { "_" } else { "" };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<11}{} ", field.label(), marker), label_style),
                Span::styled(
                    format!("{}{}", value, cursor),
                    Style::default().fg(Color::White),
                ),
            ]));
        }

        lines.push(Line::from(""));
        if let Some(ref error) = self.error {
            lines.push(Line::from(Span::styled(
                format!(" Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw("Save  "),
            Span::styled(" Tab/↑↓ ", Style::default().fg(Color::Cyan)),
            Span::raw("Field  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Cancel"),
        ]));

        let title = match self.editing {
            Some(id) => format!(" Edit User #{} ", id),
            None => " Create User ".to_string(),
        };
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn type_text(form: &mut UserForm, text: &str) {
        for c in text.chars() {
            form.handle_key_event(KeyEvent::from(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_submit_requires_name_and_valid_email() {
        let mut form = UserForm::default();
        form.open_create();
        assert_eq!(form.submit(), None);
        assert_eq!(form.error.as_deref(), Some("Name is required"));

        type_text(&mut form, "Ada");
        form.handle_key_event(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_text(&mut form, "not-an-email");
        assert_eq!(form.submit(), None);
        assert_eq!(form.error.as_deref(), Some("Invalid email address"));
    }

    #[test]
    fn test_submit_builds_payload_with_optional_fields() {
        let mut form = UserForm::default();
        form.open_create();
        type_text(&mut form, "Ada");
        form.handle_key_event(KeyEvent::from(KeyCode::Down)).unwrap();
        type_text(&mut form, "ada@example.com");

        match form.submit() {
            Some(Action::SaveUser { editing, user }) => {
                assert_eq!(editing, None);
                assert_eq!(user.name, "Ada");
                assert_eq!(user.email, "ada@example.com");
                assert_eq!(user.phone, None);
            }
            other => panic!("expected SaveUser, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_prefills_inputs() {
        let user = User {
            id: 12,
            name: "Joanna".to_string(),
            email: "jo@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            country: "Norway".to_string(),
            avatar: String::new(),
            language: "German".to_string(),
            city: String::new(),
            company: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        };
        let mut form = UserForm::default();
        form.open_edit(&user);

        let payload = form.to_new_user();
        assert_eq!(form.editing, Some(12));
        assert_eq!(payload, NewUser::from_user(&user));
    }
}
