//! Filter bar and filter editor
//!
//! The bar shows one control per filter declaration. The editor turns raw
//! input into a normalized `FilterValue` and reports it as `SetFilter`.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::filter::{
    date_range, number_input, parse_day, select_choice, text_input, toggle_choice, DateMode,
    FilterConfig, FilterKind, FilterState, FilterValue,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Filter Bar
// ═══════════════════════════════════════════════════════════════════════════════

fn value_text(config: &FilterConfig, value: Option<&FilterValue>) -> String {
    match (value, &config.kind) {
        (Some(value), FilterKind::Select { options, .. }) => match value {
            FilterValue::Choice(v) => options
                .iter()
                .find(|o| o.value == *v)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| v.clone()),
            other => other.summary(),
        },
        (Some(value), _) => value.summary(),
        (None, FilterKind::Select { options, .. }) => options
            .iter()
            .find(|o| o.is_all())
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "All".to_string()),
        (None, _) => config.placeholder.clone().unwrap_or_else(|| "any".to_string()),
    }
}

/// One line listing every filter, the focused one highlighted
pub fn filter_bar_line(configs: &[FilterConfig], state: &FilterState, focused: usize) -> Line<'static> {
    if configs.is_empty() {
        return Line::from(Span::styled(
            "No filters",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut spans = Vec::new();
    for (i, config) in configs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let active = state.get(&config.column);
        let label_style = if i == focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let value_style = if active.is_some() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{}:", config.label), label_style));
        spans.push(Span::styled(format!(" {}", value_text(config, active)), value_style));
    }
    Line::from(spans)
}

pub fn draw_filter_bar(
    frame: &mut Frame,
    area: Rect,
    configs: &[FilterConfig],
    state: &FilterState,
    focused: usize,
) {
    let title = if state.is_empty() {
        " Filters ".to_string()
    } else {
        format!(" Filters ({} active) ", state.len())
    };
    let paragraph = Paragraph::new(filter_bar_line(configs, state, focused)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Filter Editor
// ═══════════════════════════════════════════════════════════════════════════════

/// Modal editor for one filter control
#[derive(Default)]
pub struct FilterEditor {
    config: Option<FilterConfig>,
    /// Text, number, single date or range start
    pub input: String,
    /// Range end
    pub second: String,
    /// Whether the range end has focus
    pub editing_second: bool,
    /// Highlighted select option
    pub option_index: usize,
    /// Pending multi-select value
    pub pending: Option<FilterValue>,
    pub error: Option<String>,
}

impl FilterEditor {
    /// Prepare the editor for a filter, pre-filled from its current value
    pub fn open(&mut self, config: &FilterConfig, current: Option<&FilterValue>) {
        *self = Self {
            config: Some(config.clone()),
            ..Self::default()
        };

        match (current, &config.kind) {
            (Some(FilterValue::Text(s)), _) => self.input = s.clone(),
            (Some(FilterValue::Number(n)), _) => self.input = n.to_string(),
            (Some(FilterValue::Date(d)), _) => self.input = d.to_string(),
            (Some(FilterValue::Range { from, to }), _) => {
                self.input = from.to_string();
                self.second = to.map(|d| d.to_string()).unwrap_or_default();
            }
            (Some(FilterValue::Choice(v)), FilterKind::Select { options, .. }) => {
                self.option_index = options.iter().position(|o| o.value == *v).unwrap_or(0);
            }
            (Some(FilterValue::Choices(_)), _) => self.pending = current.cloned(),
            _ => {}
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.column.as_str())
    }

    fn set_filter(&self, value: Option<FilterValue>) -> Option<Action> {
        self.column().map(|column| Action::SetFilter {
            column: column.to_string(),
            value,
        })
    }

    /// Normalize the current input into a filter value
    pub fn submit(&mut self) -> Option<Action> {
        let kind = self.config.as_ref()?.kind.clone();
        let value = match kind {
            FilterKind::Text => text_input(&self.input),
            FilterKind::Number => number_input(&self.input),
            FilterKind::Select { options, multi } => {
                if multi {
                    self.pending.clone()
                } else {
                    select_choice(options.get(self.option_index))
                }
            }
            FilterKind::Date(DateMode::Single) => match parse_day(&self.input) {
                Ok(day) => day.map(FilterValue::Date),
                Err(e) => {
                    self.error = Some(e);
                    return None;
                }
            },
            FilterKind::Date(DateMode::Range) => {
                match (parse_day(&self.input), parse_day(&self.second)) {
                    (Ok(from), Ok(to)) => date_range(from, to),
                    (Err(e), _) | (_, Err(e)) => {
                        self.error = Some(e);
                        return None;
                    }
                }
            }
        };
        self.set_filter(value)
    }

    fn option_count(&self) -> usize {
        match self.config.as_ref().map(|c| &c.kind) {
            Some(FilterKind::Select { options, .. }) => options.len(),
            _ => 0,
        }
    }

    fn is_select(&self) -> bool {
        self.option_count() > 0
    }

    fn toggle_highlighted(&mut self) {
        let value = match self.config.as_ref().map(|c| &c.kind) {
            Some(FilterKind::Select { options, multi: true }) => {
                options.get(self.option_index).filter(|o| !o.is_all()).map(|o| o.value.clone())
            }
            _ => None,
        };
        if let Some(value) = value {
            self.pending = toggle_choice(self.pending.as_ref(), &value);
        }
    }

    fn is_range(&self) -> bool {
        matches!(
            self.config.as_ref().map(|c| &c.kind),
            Some(FilterKind::Date(DateMode::Range))
        )
    }

    fn active_input(&mut self) -> &mut String {
        if self.editing_second {
            &mut self.second
        } else {
            &mut self.input
        }
    }
}

impl Component for FilterEditor {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Esc {
            return Ok(Some(Action::CloseModal));
        }
        if key.code == KeyCode::Enter {
            return Ok(self.submit());
        }
        // Ctrl+u clears the filter outright
        if key.code == KeyCode::Char('u') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(self.set_filter(None));
        }

        if self.is_select() {
            let count = self.option_count();
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.option_index = self.option_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.option_index + 1 < count {
                        self.option_index += 1;
                    }
                }
                KeyCode::Char(' ') => self.toggle_highlighted(),
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab if self.is_range() => {
                self.editing_second = !self.editing_second;
            }
            KeyCode::Backspace => {
                self.active_input().pop();
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.active_input().push(c);
                self.error = None;
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let Some(config) = self.config.clone() else {
            return Ok(());
        };

        let mut lines = vec![Line::from("")];
        let input_line = |label: &str, value: &str, focused: bool| {
            let style = if focused {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:>6} ", label), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{}{}", value, cursor), style),
            ])
        };

        match &config.kind {
            FilterKind::Text | FilterKind::Number => {
                lines.push(input_line(">", &self.input, true));
                if self.input.is_empty() {
                    if let Some(placeholder) = &config.placeholder {
                        lines.push(Line::from(Span::styled(
                            format!("       {}", placeholder),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            FilterKind::Date(DateMode::Single) => {
                lines.push(input_line("Day", &self.input, true));
                lines.push(Line::from(Span::styled(
                    "       YYYY-MM-DD",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            FilterKind::Date(DateMode::Range) => {
                lines.push(input_line("From", &self.input, !self.editing_second));
                lines.push(input_line("To", &self.second, self.editing_second));
                lines.push(Line::from(Span::styled(
                    "       YYYY-MM-DD, To may stay empty",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            FilterKind::Select { options, multi } => {
                for (i, option) in options.iter().enumerate() {
                    let marker = if *multi {
                        let checked = matches!(&self.pending, Some(FilterValue::Choices(v)) if v.contains(&option.value));
                        if checked { "[x] " } else { "[ ] " }
                    } else {
                        ""
                    };
                    let style = if i == self.option_index {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    lines.push(Line::from(Span::styled(
                        format!("  {}{}", marker, option.label),
                        style,
                    )));
                }
            }
        }

        if let Some(ref error) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::from(""));
        let help = match &config.kind {
            FilterKind::Select { multi: true, .. } => "Space toggle · Enter apply · Ctrl+u clear · Esc cancel",
            FilterKind::Select { .. } => "j/k choose · Enter apply · Esc cancel",
            FilterKind::Date(DateMode::Range) => "Tab switch field · Enter apply · Ctrl+u clear · Esc cancel",
            _ => "Enter apply · Ctrl+u clear · Esc cancel",
        };
        lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));

        let height = (lines.len() as u16 + 2).max(7);
        let popup_area = centered_popup(area, 60, height);
        frame.render_widget(Clear, popup_area);

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Filter: {} ", config.label))
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
