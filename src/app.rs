//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the background fetch runner and routes finished requests back
//! into the tables and views.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::calculate_main_layout;
use crate::components::{
    ConfirmDialog, CounterView, DataTable, FilterEditor, HelpDialog, MenuDialog, MenuItem,
    NewsView, RegisterForm, TableView, UserForm,
};
use crate::config::Config;
use crate::model::column::RowId;
use crate::model::counter::Counter;
use crate::model::employee::{employee_columns, employee_filters, Employee};
use crate::model::filter::{FilterConfig, FilterState, FilterValue};
use crate::model::modal::{BulkMenuEntry, Modal, ModalStack, RowMenuEntry};
use crate::model::news::NewsFeed;
use crate::model::pagination::PaginationTheme;
use crate::model::table::{FetchRequest, TableState};
use crate::model::ui::Tab;
use crate::model::user::{all_users_filters, user_columns, user_filters, User};
use crate::services::{ApiClient, ApiMessage, ApiRequest, ExportFormat, ExportScope, FetchRunner};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info, warn};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Currently displayed tab
    pub active_tab: Tab,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background API requests
    pub runner: FetchRunner,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error message to display
    pub error: Option<String>,

    /// Status message to display
    pub status_message: Option<String>,

    /// Current config (saved when preferences change)
    pub config: Config,

    /// Where preference changes are persisted; None keeps them in memory
    pub config_path: Option<PathBuf>,

    pub counter: Counter,
    pub news: NewsFeed,
    last_news_request: Option<Instant>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub users: DataTable<User>,
    pub all_users: DataTable<User>,
    pub employees: DataTable<Employee>,
    pub news_view: NewsView,
    pub counter_view: CounterView,
    pub register: RegisterForm,
    pub quit_dialog: ConfirmDialog,
    pub confirm_dialog: ConfirmDialog,
    pub menu_dialog: MenuDialog,
    pub filter_editor: FilterEditor,
    pub user_form: UserForm,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create a new App over the given API client
    pub fn new(config: Config, client: ApiClient) -> App {
        let page_size = config.page_size.max(1);
        let theme = config.pagination_theme;

        let users_state = TableState::server_empty(user_columns(), page_size)
            .with_selection()
            .with_row_actions()
            .with_filters(logged_filters(user_filters()));
        let all_users_state = TableState::client(user_columns(), Vec::new(), page_size)
            .with_selection()
            .with_row_actions()
            .with_filters(all_users_filters());
        let employees_state = TableState::client(employee_columns(), Vec::new(), page_size)
            .with_selection()
            .with_filters(employee_filters());

        App {
            active_tab: Tab::Users,
            modals: ModalStack::new(),
            runner: FetchRunner::new(client),
            should_quit: false,
            error: None,
            status_message: None,
            config,
            config_path: None,
            counter: Counter::default(),
            news: NewsFeed::new(),
            last_news_request: None,
            // Components
            users: DataTable::new("Users", users_state, theme).editable(),
            all_users: DataTable::new("All Users", all_users_state, theme).editable(),
            employees: DataTable::new("Employees", employees_state, theme),
            news_view: NewsView,
            counter_view: CounterView,
            register: RegisterForm::default(),
            quit_dialog: ConfirmDialog::quit(),
            confirm_dialog: ConfirmDialog::delete(1),
            menu_dialog: MenuDialog::new(),
            filter_editor: FilterEditor::default(),
            user_form: UserForm::default(),
            help_dialog: HelpDialog::default(),
        }
    }

    /// Persist preference changes to `path`
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    fn active_table(&self) -> Option<&dyn TableView> {
        match self.active_tab {
            Tab::Users => Some(&self.users),
            Tab::AllUsers => Some(&self.all_users),
            Tab::Employees => Some(&self.employees),
            _ => None,
        }
    }

    fn active_table_mut(&mut self) -> Option<&mut dyn TableView> {
        match self.active_tab {
            Tab::Users => Some(&mut self.users),
            Tab::AllUsers => Some(&mut self.all_users),
            Tab::Employees => Some(&mut self.employees),
            _ => None,
        }
    }

    fn active_component(&mut self) -> &mut dyn Component {
        match self.active_tab {
            Tab::Users => &mut self.users,
            Tab::AllUsers => &mut self.all_users,
            Tab::Employees => &mut self.employees,
            Tab::News => &mut self.news_view,
            Tab::Counter => &mut self.counter_view,
            Tab::Register => &mut self.register,
        }
    }

    /// Whether the active view takes free text input
    fn is_typing(&self) -> bool {
        self.active_tab == Tab::Register && self.register.schema.is_some()
    }

    fn spawn_page(&mut self, request: FetchRequest) {
        self.runner.spawn(ApiRequest::UsersPage {
            seq: request.seq,
            params: request.params,
        });
    }

    fn refresh_users_page(&mut self) {
        if let Some(request) = self.users.state.refresh() {
            self.spawn_page(request);
        }
    }

    fn request_news(&mut self) {
        self.news.refreshing = true;
        self.last_news_request = Some(Instant::now());
        self.runner.spawn(ApiRequest::News);
    }

    fn news_due(&self) -> bool {
        if self.news.refreshing {
            return false;
        }
        let interval = Duration::from_secs(self.config.news_refresh_secs.max(1));
        self.last_news_request.map_or(true, |t| t.elapsed() >= interval)
    }

    /// Look up a user row held by the active user table
    fn find_user(&self, id: RowId) -> Option<User> {
        let table = match self.active_tab {
            Tab::Users => &self.users,
            Tab::AllUsers => &self.all_users,
            _ => return None,
        };
        table
            .state
            .displayed_rows()
            .into_iter()
            .find(|u| u.id == id)
            .cloned()
    }

    fn save_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        if let Err(e) = self.config.save_to(&path) {
            warn!("Failed to save config: {}", e);
            self.error = Some(format!("Failed to save config: {}", e));
        }
    }

    fn set_theme(&mut self, theme: PaginationTheme) {
        self.config.pagination_theme = theme;
        self.users.set_theme(theme);
        self.all_users.set_theme(theme);
        self.employees.set_theme(theme);
    }
}

/// Attach a logging `on_change` callback to each filter
fn logged_filters(configs: Vec<FilterConfig>) -> Vec<FilterConfig> {
    configs
        .into_iter()
        .map(|config| {
            let column = config.column.clone();
            config.with_on_change(Arc::new(
                move |value: Option<&FilterValue>, state: &FilterState| {
                    debug!(
                        "users filter {} = {} ({} active)",
                        column,
                        value.map(|v| v.summary()).unwrap_or_else(|| "none".to_string()),
                        state.len()
                    );
                },
            ))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        self.refresh_users_page();
        self.runner.spawn(ApiRequest::UsersSnapshot);
        self.runner.spawn(ApiRequest::Employees);
        self.runner.spawn(ApiRequest::RegisterSchema);
        self.request_news();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        self.status_message = None;
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::ForceQuit));
        }

        let global = match key.code {
            KeyCode::Tab => Some(Action::NextTab),
            KeyCode::BackTab => Some(Action::PrevTab),
            KeyCode::Esc if self.error.is_some() => {
                self.error = None;
                return Ok(None);
            }
            KeyCode::Char('q') if !self.is_typing() => Some(Action::OpenQuitDialog),
            KeyCode::Char('?') if !self.is_typing() => Some(Action::OpenHelp),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        self.active_component().handle_key_event(key)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                for message in self.runner.poll() {
                    self.handle_message(message);
                }
                if self.news_due() {
                    self.request_news();
                }
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Tabs
            // ─────────────────────────────────────────────────────────────────
            Action::NextTab => self.active_tab = self.active_tab.next(),
            Action::PrevTab => self.active_tab = self.active_tab.previous(),

            // ─────────────────────────────────────────────────────────────────
            // Table (delegate to the active DataTable)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem
            | Action::PrevItem
            | Action::FirstItem
            | Action::LastItem
            | Action::NextColumn
            | Action::PrevColumn
            | Action::ToggleSort
            | Action::NextPage
            | Action::PrevPage
            | Action::FirstPage
            | Action::LastPage
            | Action::NextFilter
            | Action::ClearFilters
            | Action::ToggleRowSelection
            | Action::ToggleSelectAll
            | Action::ClearSelection
            | Action::ToggleColumn(_) => {
                if self.active_table().is_some() {
                    return self.active_component().update(action);
                }
            }
            Action::SetFilter { .. } => {
                if matches!(self.modals.top(), Some(Modal::FilterEditor { .. })) {
                    self.modals.pop();
                }
                if self.active_table().is_some() {
                    return self.active_component().update(action);
                }
            }
            Action::CyclePageSize => {
                if self.active_table().is_some() {
                    let follow_up = self.active_component().update(action)?;
                    if let Some(size) = self.active_table().map(|t| t.page_size()) {
                        self.config.page_size = size;
                        self.save_config();
                    }
                    return Ok(follow_up);
                }
            }
            Action::TogglePaginationTheme => {
                let theme = match self.config.pagination_theme {
                    PaginationTheme::Simple => PaginationTheme::Numbered,
                    PaginationTheme::Numbered => PaginationTheme::Simple,
                };
                self.set_theme(theme);
                self.save_config();
            }
            Action::FetchPage(request) => {
                self.spawn_page(request);
            }
            Action::Refresh => match self.active_tab {
                Tab::Users => self.refresh_users_page(),
                Tab::AllUsers => self.runner.spawn(ApiRequest::UsersSnapshot),
                Tab::Employees => self.runner.spawn(ApiRequest::Employees),
                Tab::News => self.request_news(),
                Tab::Register => self.runner.spawn(ApiRequest::RegisterSchema),
                Tab::Counter => {}
            },

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help { scroll_offset: 0 });
            }
            Action::OpenRowActions => {
                let row = self
                    .active_table()
                    .filter(|t| t.row_actions_enabled())
                    .and_then(|t| t.focused_row_id());
                if let Some(row_id) = row {
                    self.modals.push(Modal::RowActions {
                        row_id,
                        selected_index: 0,
                    });
                }
            }
            Action::OpenBulkActions => {
                if self.active_table().is_some_and(|t| t.selection_len() > 0) {
                    self.modals.push(Modal::BulkActions { selected_index: 0 });
                }
            }
            Action::OpenExport => {
                if self.active_table().is_some() {
                    self.modals.push(Modal::Export {
                        selected_only: false,
                        selected_index: 0,
                    });
                }
            }
            Action::OpenColumnVisibility => {
                if self.active_table().is_some() {
                    self.modals.push(Modal::ColumnVisibility { selected_index: 0 });
                }
            }
            Action::OpenFilterEditor => {
                let focused = self.active_table().and_then(|t| {
                    let config = t.focused_filter()?.clone();
                    let current = t.filter_value(&config.column).cloned();
                    Some((config, current))
                });
                if let Some((config, current)) = focused {
                    self.filter_editor.open(&config, current.as_ref());
                    self.modals.push(Modal::FilterEditor {
                        column: config.column.clone(),
                    });
                }
            }
            Action::OpenCreateUser => {
                self.user_form.open_create();
                self.modals.push(Modal::UserForm { editing: None });
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ModalUp | Action::ModalDown => {
                let delta = if action == Action::ModalUp { -1 } else { 1 };
                let count = match self.modals.top() {
                    Some(Modal::ColumnVisibility { .. }) => self
                        .active_table()
                        .map(|t| t.column_toggles().len())
                        .unwrap_or(0),
                    Some(modal) => modal.option_count(),
                    None => 0,
                };
                self.modals.move_selection(delta, count);
            }
            Action::ConfirmModal => {
                if let Some(modal) = self.modals.top().cloned() {
                    return self.confirm_modal(modal);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Data
            // ─────────────────────────────────────────────────────────────────
            Action::Export {
                format,
                selected_only,
            } => self.export(format, selected_only),
            Action::DeleteRows(ids) => {
                if matches!(self.active_tab, Tab::Users | Tab::AllUsers) {
                    // user rows leave the tables once the server confirms
                    info!("Deleting {} user(s)", ids.len());
                    self.status_message = Some(format!("Deleting {} user(s)…", ids.len()));
                    self.runner.spawn(ApiRequest::DeleteUsers(ids));
                } else if let Some(table) = self.active_table_mut() {
                    // the employee directory is read-only on the server
                    table.remove_rows(&ids);
                }
            }
            Action::SaveUser { editing, user } => {
                if matches!(self.modals.top(), Some(Modal::UserForm { .. })) {
                    self.modals.pop();
                }
                self.status_message = Some("Saving user…".to_string());
                match editing {
                    Some(id) => self.runner.spawn(ApiRequest::UpdateUser { id, user }),
                    None => self.runner.spawn(ApiRequest::CreateUser(user)),
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Demo Views
            // ─────────────────────────────────────────────────────────────────
            Action::Increment => self.counter.increment(),
            Action::Decrement => self.counter.decrement(),
            Action::AddBy(amount) => self.counter.add_by(amount),
            Action::SubmitRegister => {
                self.register.update(Action::SubmitRegister)?;
                if let Some(ref success) = self.register.success {
                    self.status_message = Some(success.clone());
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let has_status = self.error.is_some() || self.status_message.is_some();
        let layout = calculate_main_layout(area, has_status);

        self.render_tabs(frame, layout.tabs);

        match self.active_tab {
            Tab::Users => self.users.draw(frame, layout.content)?,
            Tab::AllUsers => self.all_users.draw(frame, layout.content)?,
            Tab::Employees => self.employees.draw(frame, layout.content)?,
            Tab::News => self.news_view.draw_with_feed(
                frame,
                layout.content,
                &self.news,
                self.config.news_refresh_secs,
            )?,
            Tab::Counter => self
                .counter_view
                .draw_with_counter(frame, layout.content, &self.counter)?,
            Tab::Register => self.register.draw(frame, layout.content)?,
        }

        if let Some(status_area) = layout.status {
            self.render_status_bar(frame, status_area);
        }
        self.render_help_bar(frame, layout.help);

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::ConfirmDelete { .. } => self.confirm_dialog.handle_key_event(key),
            Modal::RowActions { .. }
            | Modal::BulkActions { .. }
            | Modal::Export { .. }
            | Modal::ColumnVisibility { .. } => {
                // keep Space toggling in the column list
                self.prepare_menu(modal);
                self.menu_dialog.handle_key_event(key)
            }
            Modal::FilterEditor { .. } => self.filter_editor.handle_key_event(key),
            Modal::UserForm { .. } => self.user_form.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
        }
    }

    /// Act on the confirmed entry of the top modal
    fn confirm_modal(&mut self, modal: Modal) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => {
                self.should_quit = true;
            }
            Modal::ConfirmDelete { ids, bulk } => {
                self.modals.pop();
                debug!("Confirmed delete of {:?} (bulk: {})", ids, bulk);
                return Ok(Some(Action::DeleteRows(ids)));
            }
            Modal::RowActions {
                row_id,
                selected_index,
            } => match RowMenuEntry::ALL.get(selected_index) {
                Some(RowMenuEntry::Edit) => match self.find_user(row_id) {
                    Some(user) => {
                        self.user_form.open_edit(&user);
                        self.modals.replace_top(Modal::UserForm {
                            editing: Some(row_id),
                        });
                    }
                    None => {
                        self.modals.pop();
                        self.error = Some(format!("User #{} is no longer loaded", row_id));
                    }
                },
                Some(RowMenuEntry::Delete) => {
                    self.confirm_dialog = ConfirmDialog::delete(1);
                    self.modals.replace_top(Modal::ConfirmDelete {
                        ids: vec![row_id],
                        bulk: false,
                    });
                }
                None => {}
            },
            Modal::BulkActions { selected_index } => match BulkMenuEntry::ALL.get(selected_index) {
                Some(BulkMenuEntry::Delete) => {
                    let ids = self
                        .active_table()
                        .map(|t| t.selected_ids())
                        .unwrap_or_default();
                    if ids.is_empty() {
                        self.modals.pop();
                    } else {
                        self.confirm_dialog = ConfirmDialog::delete(ids.len());
                        self.modals.replace_top(Modal::ConfirmDelete { ids, bulk: true });
                    }
                }
                Some(BulkMenuEntry::Export) => {
                    self.modals.replace_top(Modal::Export {
                        selected_only: true,
                        selected_index: 0,
                    });
                }
                Some(BulkMenuEntry::Clear) => {
                    self.modals.pop();
                    return Ok(Some(Action::ClearSelection));
                }
                None => {}
            },
            Modal::Export {
                selected_only,
                selected_index,
            } => {
                self.modals.pop();
                if let Some(format) = ExportFormat::ALL.get(selected_index) {
                    return Ok(Some(Action::Export {
                        format: *format,
                        selected_only,
                    }));
                }
            }
            Modal::ColumnVisibility { selected_index } => {
                let key = self
                    .active_table()
                    .and_then(|t| t.column_toggles().get(selected_index).map(|(k, _, _)| k.clone()));
                if let Some(key) = key {
                    return Ok(Some(Action::ToggleColumn(key)));
                }
            }
            Modal::FilterEditor { .. } => return Ok(self.filter_editor.submit()),
            Modal::UserForm { .. } => return Ok(self.user_form.submit()),
            Modal::Help { .. } => {
                self.modals.pop();
            }
        }
        Ok(None)
    }

    fn export(&mut self, format: ExportFormat, selected_only: bool) {
        let scope = if selected_only {
            ExportScope::Selected
        } else {
            ExportScope::All
        };
        let dir = PathBuf::from(&self.config.export_dir);
        let Some(table) = self.active_table() else {
            return;
        };

        match table.export(format, scope, &dir) {
            Ok(Some(path)) => {
                self.status_message = Some(format!("Exported to {}", path.display()));
            }
            Ok(None) => {
                self.status_message = Some("No rows selected; nothing exported".to_string());
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Route a finished background request
    fn handle_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::UsersPage { seq, result } => {
                self.users.apply_page(seq, result);
            }
            ApiMessage::UsersSnapshot(result) => match result {
                Ok(rows) => {
                    self.all_users.state.set_rows(rows);
                    self.all_users.state.error = None;
                }
                Err(e) => self.all_users.state.error = Some(e),
            },
            ApiMessage::Employees(result) => match result {
                Ok(rows) => {
                    self.employees.state.set_rows(rows);
                    self.employees.state.error = None;
                }
                Err(e) => self.employees.state.error = Some(e),
            },
            ApiMessage::News(result) => self.news.apply(result),
            ApiMessage::RegisterSchema(result) => self.register.set_schema(result),
            ApiMessage::UserSaved { created, result } => match result {
                Ok(user) => {
                    let verb = if created { "Created" } else { "Updated" };
                    self.status_message = Some(format!("{} user #{} ({})", verb, user.id, user.name));
                    self.all_users.state.upsert_row(user);
                    self.refresh_users_page();
                }
                Err(e) => {
                    self.status_message = None;
                    self.error = Some(format!("Failed to save user: {}", e));
                }
            },
            ApiMessage::UsersDeleted { deleted, failed } => {
                self.all_users.remove_rows(&deleted);
                self.users.remove_rows(&deleted);
                self.status_message = Some(format!("Deleted {} user(s)", deleted.len()));
                if let Some((id, reason)) = failed.first() {
                    self.error = Some(format!(
                        "Failed to delete {} user(s); #{}: {}",
                        failed.len(),
                        id,
                        reason
                    ));
                }
                self.refresh_users_page();
            }
        }
    }

    /// Load the menu entries for a list modal
    fn prepare_menu(&mut self, modal: &Modal) {
        match modal {
            Modal::RowActions {
                row_id,
                selected_index,
            } => {
                let items = RowMenuEntry::ALL
                    .iter()
                    .map(|entry| match entry {
                        RowMenuEntry::Delete => MenuItem::plain(entry.label()).destructive(),
                        _ => MenuItem::plain(entry.label()),
                    })
                    .collect();
                self.menu_dialog
                    .set_menu(&format!("User #{}", row_id), items, *selected_index);
            }
            Modal::BulkActions { selected_index } => {
                let count = self.active_table().map(|t| t.selection_len()).unwrap_or(0);
                let items = BulkMenuEntry::ALL
                    .iter()
                    .map(|entry| match entry {
                        BulkMenuEntry::Delete => MenuItem::plain(entry.label()).destructive(),
                        _ => MenuItem::plain(entry.label()),
                    })
                    .collect();
                self.menu_dialog
                    .set_menu(&format!("{} selected", count), items, *selected_index);
            }
            Modal::Export {
                selected_only,
                selected_index,
            } => {
                let title = if *selected_only { "Export selected" } else { "Export" };
                let items = ExportFormat::ALL
                    .iter()
                    .map(|f| MenuItem::plain(f.label()))
                    .collect();
                self.menu_dialog.set_menu(title, items, *selected_index);
            }
            Modal::ColumnVisibility { selected_index } => {
                let items = self
                    .active_table()
                    .map(|t| t.column_toggles())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(_, label, visible)| MenuItem::toggle(label, visible))
                    .collect();
                self.menu_dialog.set_menu("Columns", items, *selected_index);
            }
            _ => {}
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::ConfirmDelete { .. } => self.confirm_dialog.draw(frame, area)?,
            Modal::RowActions { .. }
            | Modal::BulkActions { .. }
            | Modal::Export { .. }
            | Modal::ColumnVisibility { .. } => {
                self.prepare_menu(modal);
                self.menu_dialog.draw(frame, area)?;
            }
            Modal::FilterEditor { .. } => self.filter_editor.draw(frame, area)?,
            Modal::UserForm { .. } => self.user_form.draw(frame, area)?,
            Modal::Help { .. } => self.help_dialog.draw(frame, area)?,
        }
        Ok(())
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let all_tabs = Tab::all();
        let titles: Vec<&str> = all_tabs.iter().map(|t| t.name()).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::BOTTOM))
            .select(self.active_tab.index())
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![];

        if let Some(ref error) = self.error {
            spans.push(Span::styled(
                format!(" Error: {} ", error),
                Style::default().fg(Color::Red),
            ));
            spans.push(Span::styled("(Esc to dismiss) ", Style::default().fg(Color::DarkGray)));
        }

        if let Some(ref status) = self.status_message {
            spans.push(Span::styled(
                format!(" {} ", status),
                Style::default().fg(Color::Yellow),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let key = |k: &str| {
            Span::styled(
                format!(" {} ", k),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        };

        let mut spans = match self.active_tab {
            tab if tab.has_table() => {
                let selected = self.active_table().map(|t| t.selection_len()).unwrap_or(0);
                let mut spans = vec![
                    key("j/k"),
                    Span::raw("Rows  "),
                    key("n/p"),
                    Span::raw("Page  "),
                    key("s"),
                    Span::raw("Sort  "),
                    key("/"),
                    Span::raw("Filter  "),
                    key("e"),
                    Span::raw("Export  "),
                ];
                if selected > 0 {
                    spans.push(key("b"));
                    spans.push(Span::raw("Bulk  "));
                    spans.push(Span::styled(
                        format!("{} selected  ", selected),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                spans
            }
            Tab::News => vec![key("r"), Span::raw("Refresh  ")],
            Tab::Counter => vec![
                key("+/-"),
                Span::raw("Change  "),
                key("Enter"),
                Span::raw("Add 5  "),
            ],
            _ => vec![
                key("↑/↓"),
                Span::raw("Field  "),
                key("Enter"),
                Span::raw("Submit  "),
            ],
        };
        spans.push(key("Tab"));
        spans.push(Span::raw("Switch  "));
        spans.push(key("?"));
        spans.push(Span::raw("Help  "));
        if !self.is_typing() {
            spans.push(key("q"));
            spans.push(Span::raw("Quit"));
        }

        let help = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}
