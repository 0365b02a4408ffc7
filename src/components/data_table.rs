//! Data table component
//!
//! Renders a `TableState` with its filter bar and pagination bar, and turns
//! key presses into table actions. Server fetches are handed back to the
//! App as `Action::FetchPage`.

use crate::action::Action;
use crate::component::Component;
use crate::components::filter_bar::draw_filter_bar;
use crate::components::layout::calculate_table_layout;
use crate::components::pagination_bar::{draw_pagination_bar, PaginationView};
use crate::model::column::{Column, ColumnKind, Record, RowId};
use crate::model::filter::{FilterConfig, FilterValue};
use crate::model::pagination::{next_page_size, PaginationTheme};
use crate::model::table::{
    ApplyOutcome, Navigation, PageResponse, SelectAllState, TableMode, TableState,
};
use crate::services::export::{export_table, ExportError, ExportFormat, ExportScope};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use log::debug;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

/// Widest a column may grow
const MAX_COLUMN_WIDTH: usize = 40;

// ═══════════════════════════════════════════════════════════════════════════════
// Table View Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Record-independent operations the App performs on the active table
pub trait TableView {
    fn focused_filter(&self) -> Option<&FilterConfig>;
    fn filter_value(&self, column: &str) -> Option<&FilterValue>;
    /// `(key, label, visible)` for every column
    fn column_toggles(&self) -> Vec<(String, String, bool)>;
    fn export(
        &self,
        format: ExportFormat,
        scope: ExportScope,
        dir: &Path,
    ) -> Result<Option<PathBuf>, ExportError>;
    fn selection_len(&self) -> usize;
    fn selected_ids(&self) -> Vec<RowId>;
    fn focused_row_id(&self) -> Option<RowId>;
    fn row_actions_enabled(&self) -> bool;
    fn remove_rows(&mut self, ids: &[RowId]);
    fn set_theme(&mut self, theme: PaginationTheme);
    fn page_size(&self) -> usize;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Data Table Component
// ═══════════════════════════════════════════════════════════════════════════════

pub struct DataTable<R: Record> {
    pub title: String,
    pub state: TableState<R>,
    /// Focused data column, the target of sorting
    pub column_cursor: usize,
    /// Focused filter in the filter bar
    pub filter_cursor: usize,
    pub theme: PaginationTheme,
    /// Whether rows can be created and edited
    pub editable: bool,
}

impl<R: Record> DataTable<R> {
    pub fn new(title: impl Into<String>, state: TableState<R>, theme: PaginationTheme) -> Self {
        Self {
            title: title.into(),
            state,
            column_cursor: 0,
            filter_cursor: 0,
            theme,
            editable: false,
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Keys of the visible data columns, in display order
    fn data_keys(&self) -> Vec<String> {
        self.state
            .visible_columns()
            .into_iter()
            .filter(|c| c.is_data())
            .map(|c| c.key.clone())
            .collect()
    }

    pub fn focused_column_key(&self) -> Option<String> {
        self.data_keys().get(self.column_cursor).cloned()
    }

    /// Apply a server page, logging discarded responses
    pub fn apply_page(&mut self, seq: u64, result: Result<PageResponse<R>, String>) -> ApplyOutcome {
        let outcome = self.state.apply_response(seq, result);
        match outcome {
            ApplyOutcome::Stale => debug!("{}: discarded stale response #{}", self.title, seq),
            ApplyOutcome::Failed => debug!("{}: fetch #{} failed, keeping last page", self.title, seq),
            ApplyOutcome::Applied => {}
        }
        outcome
    }

    fn navigated(&self, navigation: Option<Navigation>) -> Option<Action> {
        let navigation = navigation?;
        debug!("{}: {:?}", self.title, navigation.event);
        navigation.fetch.map(Action::FetchPage)
    }

    fn clamp_column_cursor(&mut self) {
        let count = self.data_keys().len();
        self.column_cursor = self.column_cursor.min(count.saturating_sub(1));
    }

    fn header_cell(&self, column: &Column<R>, focused: Option<&str>) -> (String, Style) {
        let base = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        match column.kind {
            ColumnKind::Select => {
                let mark = match self.state.select_all_state() {
                    SelectAllState::None => "[ ]",
                    SelectAllState::Indeterminate => "[-]",
                    SelectAllState::All => "[x]",
                };
                (mark.to_string(), base)
            }
            ColumnKind::Actions => ("Actions".to_string(), base),
            ColumnKind::Data => {
                let mut label = column.label.clone();
                if let Some(sort) = self.state.sort() {
                    if sort.column == column.key {
                        label = format!("{} {}", label, sort.arrow());
                    }
                }
                let style = if focused == Some(column.key.as_str()) {
                    base.add_modifier(Modifier::UNDERLINED)
                } else {
                    base
                };
                (label, style)
            }
        }
    }

    fn body_cell(&self, column: &Column<R>, row: &R) -> String {
        match column.kind {
            ColumnKind::Select => {
                if self.state.is_selected(row.row_id()) {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            ColumnKind::Actions => "⋯".to_string(),
            ColumnKind::Data => column.cell_text(row),
        }
    }

    /// Header, separator and one line per displayed row
    pub fn build_lines(&self) -> Vec<Line<'static>> {
        let columns = self.state.visible_columns();
        let rows = self.state.displayed_rows();
        let focused = self.focused_column_key();

        let headers: Vec<(String, Style)> = columns
            .iter()
            .map(|c| self.header_cell(c, focused.as_deref()))
            .collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| columns.iter().map(|c| self.body_cell(c, row)).collect())
            .collect();

        let header_texts: Vec<&str> = headers.iter().map(|(h, _)| h.as_str()).collect();
        let widths = column_widths(&header_texts, &cells);

        let mut lines = Vec::new();
        if let Some(ref error) = self.state.error {
            lines.push(Line::from(Span::styled(
                format!("⚠ {}", error),
                Style::default().fg(Color::Red),
            )));
        }

        let header_spans: Vec<Span> = headers
            .iter()
            .zip(&widths)
            .flat_map(|((text, style), width)| {
                vec![
                    Span::styled(fit_cell(text, *width), *style),
                    Span::raw(" │ "),
                ]
            })
            .collect();
        lines.push(Line::from(header_spans));

        let separator: String = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )));

        if cells.is_empty() {
            let message = if self.state.is_loading() {
                "Loading..."
            } else {
                "No results."
            };
            lines.push(Line::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        for (index, row) in cells.iter().enumerate() {
            let style = if index == self.state.cursor {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let spans: Vec<Span> = row
                .iter()
                .zip(&widths)
                .flat_map(|(cell, width)| {
                    vec![Span::styled(fit_cell(cell, *width), style), Span::styled(" │ ", style)]
                })
                .collect();
            lines.push(Line::from(spans));
        }

        lines
    }

    fn pagination_view(&self) -> PaginationView {
        PaginationView {
            theme: self.theme,
            page_index: self.state.pagination.page_index,
            total_pages: self.state.total_pages(),
            page_size: self.state.pagination.page_size,
            total_count: self.state.total_count(),
            loading: self.state.is_loading(),
        }
    }
}

/// Column widths from headers and cells, capped at `MAX_COLUMN_WIDTH`
pub fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            }
        }
    }
    for width in &mut widths {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }
    widths
}

/// Pad or truncate a cell to exactly `width` display columns
pub fn fit_cell(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl<R: Record> Component for DataTable<R> {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            // Rows
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Char('g') => Some(Action::FirstItem),
            KeyCode::Char('G') => Some(Action::LastItem),

            // Columns and sorting
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevColumn),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextColumn),
            KeyCode::Char('s') => Some(Action::ToggleSort),
            KeyCode::Char('c') => Some(Action::OpenColumnVisibility),

            // Pages
            KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(Action::PrevPage),
            KeyCode::Home => Some(Action::FirstPage),
            KeyCode::End => Some(Action::LastPage),
            KeyCode::Char('z') => Some(Action::CyclePageSize),
            KeyCode::Char('t') => Some(Action::TogglePaginationTheme),

            // Filters
            KeyCode::Char('f') => Some(Action::NextFilter),
            KeyCode::Char('/') => Some(Action::OpenFilterEditor),
            KeyCode::Char('x') => Some(Action::ClearFilters),

            // Selection
            KeyCode::Char(' ') if self.state.selection_enabled() => Some(Action::ToggleRowSelection),
            KeyCode::Char('a') if self.state.selection_enabled() => Some(Action::ToggleSelectAll),
            KeyCode::Esc if self.state.selection_len() > 0 => Some(Action::ClearSelection),
            KeyCode::Char('b') if self.state.selection_len() > 0 => Some(Action::OpenBulkActions),

            // Rows actions and data
            KeyCode::Enter if self.state.row_actions_enabled() => Some(Action::OpenRowActions),
            KeyCode::Char('+') if self.editable => Some(Action::OpenCreateUser),
            KeyCode::Char('e') => Some(Action::OpenExport),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::NextItem => {
                self.state.move_cursor(1);
                None
            }
            Action::PrevItem => {
                self.state.move_cursor(-1);
                None
            }
            Action::FirstItem => {
                self.state.cursor = 0;
                None
            }
            Action::LastItem => {
                self.state.cursor = self.state.displayed_rows().len().saturating_sub(1);
                None
            }
            Action::NextColumn => {
                if self.column_cursor + 1 < self.data_keys().len() {
                    self.column_cursor += 1;
                }
                None
            }
            Action::PrevColumn => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
                None
            }
            Action::ToggleSort => {
                let key = self.focused_column_key();
                key.and_then(|k| self.state.toggle_sort(&k)).map(Action::FetchPage)
            }
            Action::NextPage => {
                let navigation = self.state.next_page();
                self.navigated(navigation)
            }
            Action::PrevPage => {
                let navigation = self.state.previous_page();
                self.navigated(navigation)
            }
            Action::FirstPage => {
                let navigation = self.state.go_to_page(0);
                self.navigated(navigation)
            }
            Action::LastPage => {
                let last = self.state.total_pages().saturating_sub(1);
                let navigation = self.state.go_to_page(last);
                self.navigated(navigation)
            }
            Action::CyclePageSize => {
                let size = next_page_size(self.state.pagination.page_size);
                let navigation = self.state.set_page_size(size);
                self.navigated(navigation)
            }
            Action::NextFilter => {
                let count = self.state.filter_configs().len();
                if count > 0 {
                    self.filter_cursor = (self.filter_cursor + 1) % count;
                }
                None
            }
            Action::SetFilter { column, value } => {
                self.state.set_filter(&column, value).map(Action::FetchPage)
            }
            Action::ClearFilters => self.state.clear_filters().map(Action::FetchPage),
            Action::ToggleRowSelection => {
                if let Some(id) = self.state.focused_row().map(|r| r.row_id()) {
                    self.state.toggle_row(id);
                }
                None
            }
            Action::ToggleSelectAll => {
                self.state.toggle_all_on_page();
                None
            }
            Action::ClearSelection => {
                self.state.clear_selection();
                None
            }
            Action::Refresh => self.state.refresh().map(Action::FetchPage),
            Action::ToggleColumn(key) => {
                self.state.toggle_column_visibility(&key);
                self.clamp_column_cursor();
                None
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_table_layout(area);

        draw_filter_bar(
            frame,
            layout.filters,
            self.state.filter_configs(),
            self.state.filters(),
            self.filter_cursor,
        );

        let lines = self.build_lines();
        // keep the focused row in view below the header lines
        let header_lines = lines.len().saturating_sub(self.state.displayed_rows().len());
        let visible = (layout.table.height.saturating_sub(2) as usize).saturating_sub(header_lines);
        let scroll = if visible > 0 {
            self.state.cursor.saturating_sub(visible - 1)
        } else {
            0
        };

        let mode = match self.state.mode() {
            TableMode::Server => "server",
            TableMode::Client => "client",
        };
        let mut title = format!(" {} ({}) ", self.title, mode);
        if self.state.selection_len() > 0 {
            title = format!(" {} ({}) · {} selected ", self.title, mode, self.state.selection_len());
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, layout.table);

        draw_pagination_bar(frame, layout.pagination, &self.pagination_view());
        Ok(())
    }
}

impl<R: Record> TableView for DataTable<R> {
    fn focused_filter(&self) -> Option<&FilterConfig> {
        self.state.filter_configs().get(self.filter_cursor)
    }

    fn filter_value(&self, column: &str) -> Option<&FilterValue> {
        self.state.filters().get(column)
    }

    fn column_toggles(&self) -> Vec<(String, String, bool)> {
        self.state
            .columns()
            .iter()
            .filter(|c| c.is_data())
            .map(|c| (c.key.clone(), c.label.clone(), self.state.is_column_visible(&c.key)))
            .collect()
    }

    fn export(
        &self,
        format: ExportFormat,
        scope: ExportScope,
        dir: &Path,
    ) -> Result<Option<PathBuf>, ExportError> {
        export_table(&self.state, format, scope, dir)
    }

    fn selection_len(&self) -> usize {
        self.state.selection_len()
    }

    fn selected_ids(&self) -> Vec<RowId> {
        self.state.selected_ids()
    }

    fn focused_row_id(&self) -> Option<RowId> {
        self.state.focused_row().map(|r| r.row_id())
    }

    fn row_actions_enabled(&self) -> bool {
        self.state.row_actions_enabled()
    }

    fn remove_rows(&mut self, ids: &[RowId]) {
        self.state.remove_rows(ids);
    }

    fn set_theme(&mut self, theme: PaginationTheme) {
        self.theme = theme;
    }

    fn page_size(&self) -> usize {
        self.state.pagination.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::{employee_columns, employee_filters, Employee};
    use crate::model::table::PageResponse;

    fn employee(id: i64, name: &str, company: &str) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            company: company.to_string(),
            phone: String::new(),
            pabx: String::new(),
            email: String::new(),
            image: String::new(),
        }
    }

    fn client_table() -> DataTable<Employee> {
        let rows = vec![
            employee(1, "John", "Acme"),
            employee(2, "Amy", "Globex"),
            employee(3, "Joanna", "Acme"),
        ];
        let state = TableState::client(employee_columns(), rows, 2)
            .with_selection()
            .with_filters(employee_filters());
        DataTable::new("Employees", state, PaginationTheme::Numbered)
    }

    fn server_table() -> DataTable<Employee> {
        let page = PageResponse {
            data: vec![employee(9, "Zed", "Initech"), employee(8, "Yan", "Initech")],
            total_pages: 3,
            total_count: 6,
            current_page: 0,
            page_size: 2,
        };
        let state = TableState::server(employee_columns(), page);
        DataTable::new("Users", state, PaginationTheme::Simple)
    }

    fn names(table: &DataTable<Employee>) -> Vec<String> {
        table
            .state
            .displayed_rows()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn test_fit_cell_pads_and_truncates() {
        assert_eq!(fit_cell("abc", 5), "abc  ");
        assert_eq!(fit_cell("abcdef", 4), "abc…");
        assert_eq!(fit_cell("", 2), "  ");
    }

    #[test]
    fn test_column_widths_are_capped() {
        let long = "x".repeat(100);
        let widths = column_widths(&["ID", "Name"], &[vec!["1".to_string(), long]]);
        assert_eq!(widths, vec![2, MAX_COLUMN_WIDTH]);
    }

    #[test]
    fn test_client_sort_and_filter_need_no_fetch() {
        let mut table = client_table();
        table.update(Action::NextColumn).unwrap();
        assert_eq!(table.focused_column_key().as_deref(), Some("name"));

        assert_eq!(table.update(Action::ToggleSort).unwrap(), None);
        assert_eq!(names(&table), vec!["Amy", "Joanna"]);

        let action = table
            .update(Action::SetFilter {
                column: "name".to_string(),
                value: Some(FilterValue::Text("jo".to_string())),
            })
            .unwrap();
        assert_eq!(action, None);
        assert_eq!(names(&table), vec!["Joanna", "John"]);
    }

    #[test]
    fn test_server_navigation_requests_fetch() {
        let mut table = server_table();
        let action = table.update(Action::NextPage).unwrap();
        match action {
            Some(Action::FetchPage(request)) => {
                assert!(request.params.contains(&("page".to_string(), "1".to_string())));
                assert!(request.params.contains(&("pageSize".to_string(), "2".to_string())));
            }
            other => panic!("expected a fetch, got {:?}", other),
        }
        assert!(table.state.is_loading());

        // previous page is disabled on page 0 of a fresh table
        let mut table = server_table();
        assert_eq!(table.update(Action::PrevPage).unwrap(), None);
    }

    #[test]
    fn test_select_all_is_page_scoped() {
        let mut table = client_table();
        table.update(Action::ToggleSelectAll).unwrap();
        assert_eq!(table.selected_ids(), vec![1, 2]);

        table.update(Action::ToggleSelectAll).unwrap();
        assert_eq!(table.selection_len(), 0);
    }

    #[test]
    fn test_hidden_column_leaves_toggles_and_render() {
        let mut table = client_table();
        table.update(Action::ToggleColumn("company".to_string())).unwrap();
        let toggles = table.column_toggles();
        assert!(toggles.contains(&("company".to_string(), "Company".to_string(), false)));

        let header: String = table.build_lines()[0]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(header.contains("Name"));
        assert!(!header.contains("Company"));
    }

    #[test]
    fn test_error_line_keeps_rows() {
        let mut table = server_table();
        let request = match table.update(Action::Refresh).unwrap() {
            Some(Action::FetchPage(request)) => request,
            other => panic!("expected a fetch, got {:?}", other),
        };
        let outcome = table.apply_page(request.seq, Err("HTTP 500: boom".to_string()));
        assert_eq!(outcome, ApplyOutcome::Failed);

        let lines = table.build_lines();
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "⚠ HTTP 500: boom");
        assert_eq!(names(&table), vec!["Zed", "Yan"]);
    }
}
