//! Table core
//!
//! Owns sorting, filtering, pagination, selection and column visibility for
//! one table. In client mode rows are filtered, sorted and sliced in memory.
//! In server mode the held rows are exactly the page the server returned and
//! every state change yields a `FetchRequest` instead.

use super::column::{Column, ColumnKind, Record, RowId};
use super::filter::{FilterConfig, FilterState, FilterValue};
use super::pagination::{total_pages, PageEvent, PaginationState};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

// ═══════════════════════════════════════════════════════════════════════════════
// Supporting Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

/// Where the table's rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Client,
    Server,
}

/// Header checkbox state for the displayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    None,
    Indeterminate,
    All,
}

/// One page as returned by the read endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<R> {
    pub data: Vec<R>,
    pub total_pages: usize,
    pub total_count: usize,
    pub current_page: usize,
    pub page_size: usize,
}

/// A page fetch the owner must perform, tagged with a sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub params: Vec<(String, String)>,
}

/// Result of a navigation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub event: PageEvent,
    pub fetch: Option<FetchRequest>,
}

/// What happened to a server response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request is in flight; the response was dropped
    Stale,
    /// The fetch failed; the last good page is kept
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table State
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableState<R: Record> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    mode: TableMode,
    filter_configs: Vec<FilterConfig>,
    filters: FilterState,
    sort: Option<SortState>,
    pub pagination: PaginationState,
    server_total_pages: usize,
    server_total_count: usize,
    selection: BTreeSet<RowId>,
    hidden: HashSet<String>,
    /// Focused row within the displayed page
    pub cursor: usize,
    next_seq: u64,
    pending_seq: Option<u64>,
    /// Last fetch error, shown inline
    pub error: Option<String>,
}

impl<R: Record> TableState<R> {
    /// Table over an in-memory row set
    pub fn client(columns: Vec<Column<R>>, rows: Vec<R>, page_size: usize) -> Self {
        Self::build(columns, rows, TableMode::Client, PaginationState::new(0, page_size))
    }

    /// Table over server pages, seeded with the first response
    pub fn server(columns: Vec<Column<R>>, initial: PageResponse<R>) -> Self {
        let pagination = PaginationState::new(initial.current_page, initial.page_size);
        let mut table = Self::build(columns, initial.data, TableMode::Server, pagination);
        table.server_total_pages = initial.total_pages.max(1);
        table.server_total_count = initial.total_count;
        table
    }

    /// Server table with no data yet; call `refresh` to issue the first fetch
    pub fn server_empty(columns: Vec<Column<R>>, page_size: usize) -> Self {
        Self::build(columns, Vec::new(), TableMode::Server, PaginationState::new(0, page_size))
    }

    fn build(columns: Vec<Column<R>>, rows: Vec<R>, mode: TableMode, pagination: PaginationState) -> Self {
        Self {
            columns,
            rows,
            mode,
            filter_configs: Vec::new(),
            filters: FilterState::new(),
            sort: None,
            pagination,
            server_total_pages: 1,
            server_total_count: 0,
            selection: BTreeSet::new(),
            hidden: HashSet::new(),
            cursor: 0,
            next_seq: 0,
            pending_seq: None,
            error: None,
        }
    }

    /// Prepend the checkbox column
    pub fn with_selection(mut self) -> Self {
        if !self.selection_enabled() {
            self.columns.insert(0, Column::select());
        }
        self
    }

    /// Append the implicit actions column
    pub fn with_row_actions(mut self) -> Self {
        if !self.columns.iter().any(|c| c.kind == ColumnKind::Actions) {
            self.columns.push(Column::actions());
        }
        self
    }

    pub fn with_filters(mut self, configs: Vec<FilterConfig>) -> Self {
        self.filter_configs = configs;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn filter_configs(&self) -> &[FilterConfig] {
        &self.filter_configs
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn selection_enabled(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Select)
    }

    pub fn row_actions_enabled(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Actions)
    }

    pub fn is_loading(&self) -> bool {
        self.pending_seq.is_some()
    }

    /// Columns currently rendered, in display order
    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(&c.key))
            .collect()
    }

    /// Columns written by exports: visible data columns only
    pub fn export_columns(&self) -> Vec<&Column<R>> {
        self.visible_columns()
            .into_iter()
            .filter(|c| c.is_data())
            .collect()
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        !self.hidden.contains(key)
    }

    pub fn toggle_column_visibility(&mut self, key: &str) {
        if !self.hidden.remove(key) {
            self.hidden.insert(key.to_string());
        }
    }

    fn column(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row Models
    // ─────────────────────────────────────────────────────────────────────────

    /// Rows passing every active filter, sorted. Server rows pass through untouched.
    pub fn filtered_rows(&self) -> Vec<&R> {
        if self.mode == TableMode::Server {
            return self.rows.iter().collect();
        }

        let mut rows: Vec<&R> = self
            .rows
            .iter()
            .filter(|row| {
                self.filters.iter().all(|(key, value)| match self.column(key) {
                    Some(column) => column.matches(row, value),
                    None => true,
                })
            })
            .collect();

        if let Some(sort) = &self.sort {
            if let Some(column) = self.column(&sort.column) {
                // stable sort keeps original order among equal keys
                rows.sort_by(|a, b| compare_by(column, sort.direction, a, b));
            }
        }
        rows
    }

    /// Rows of the current page
    pub fn displayed_rows(&self) -> Vec<&R> {
        match self.mode {
            TableMode::Server => self.rows.iter().collect(),
            TableMode::Client => {
                let rows = self.filtered_rows();
                let (start, end) = self.pagination.slice_bounds(rows.len());
                rows[start..end].to_vec()
            }
        }
    }

    pub fn total_pages(&self) -> usize {
        match self.mode {
            TableMode::Server => self.server_total_pages.max(1),
            TableMode::Client => total_pages(self.filtered_rows().len(), self.pagination.page_size),
        }
    }

    /// Total row count across all pages
    pub fn total_count(&self) -> usize {
        match self.mode {
            TableMode::Server => self.server_total_count,
            TableMode::Client => self.filtered_rows().len(),
        }
    }

    pub fn focused_row(&self) -> Option<&R> {
        self.displayed_rows().get(self.cursor).copied()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.displayed_rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────

    /// Cycle a column through none → asc → desc → none.
    ///
    /// Returns a fetch in server mode. Unsortable columns are ignored.
    pub fn toggle_sort(&mut self, key: &str) -> Option<FetchRequest> {
        if !self.column(key).is_some_and(|c| c.sortable && c.is_data()) {
            return None;
        }

        self.sort = match self.sort.take() {
            Some(s) if s.column == key => match s.direction {
                SortDirection::Asc => Some(SortState {
                    column: s.column,
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(SortState {
                column: key.to_string(),
                direction: SortDirection::Asc,
            }),
        };

        match self.mode {
            TableMode::Server => Some(self.issue_fetch()),
            TableMode::Client => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Filtering
    // ─────────────────────────────────────────────────────────────────────────

    /// Set or clear a column filter.
    ///
    /// Resets to the first page, fires the filter's `on_change` callback and
    /// returns a fetch in server mode.
    pub fn set_filter(&mut self, column: &str, value: Option<FilterValue>) -> Option<FetchRequest> {
        self.filters.set(column, value);
        self.pagination.page_index = 0;
        self.cursor = 0;

        if let Some(config) = self.filter_configs.iter().find(|c| c.column == column) {
            if let Some(callback) = &config.on_change {
                callback(self.filters.get(column), &self.filters);
            }
        }

        match self.mode {
            TableMode::Server => Some(self.issue_fetch()),
            TableMode::Client => None,
        }
    }

    pub fn clear_filters(&mut self) -> Option<FetchRequest> {
        self.filters.clear();
        self.pagination.page_index = 0;
        self.cursor = 0;
        match self.mode {
            TableMode::Server => Some(self.issue_fetch()),
            TableMode::Client => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pagination
    // ─────────────────────────────────────────────────────────────────────────

    pub fn next_page(&mut self) -> Option<Navigation> {
        let total = self.total_pages();
        let event = self.pagination.next(total)?;
        Some(self.navigated(event))
    }

    pub fn previous_page(&mut self) -> Option<Navigation> {
        let event = self.pagination.previous()?;
        Some(self.navigated(event))
    }

    pub fn go_to_page(&mut self, page_index: usize) -> Option<Navigation> {
        let total = self.total_pages();
        let event = self.pagination.go_to(page_index, total)?;
        Some(self.navigated(event))
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Option<Navigation> {
        let count = match self.mode {
            TableMode::Client => Some(self.filtered_rows().len()),
            TableMode::Server => Some(self.server_total_count),
        };
        let event = self.pagination.set_page_size(page_size, count)?;
        Some(self.navigated(event))
    }

    fn navigated(&mut self, event: PageEvent) -> Navigation {
        self.cursor = 0;
        let fetch = match self.mode {
            TableMode::Server => Some(self.issue_fetch()),
            TableMode::Client => None,
        };
        Navigation { event, fetch }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Server Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-fetch the current page (server mode only)
    pub fn refresh(&mut self) -> Option<FetchRequest> {
        match self.mode {
            TableMode::Server => Some(self.issue_fetch()),
            TableMode::Client => None,
        }
    }

    /// Query parameters for the current page, filters and sort
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.pagination.page_index.to_string()),
            ("pageSize".to_string(), self.pagination.page_size.to_string()),
        ];
        params.extend(self.filters.to_query_pairs());
        if let Some(sort) = &self.sort {
            params.push(("sortBy".to_string(), sort.column.clone()));
            params.push(("sortOrder".to_string(), sort.direction.as_param().to_string()));
        }
        params
    }

    fn issue_fetch(&mut self) -> FetchRequest {
        self.next_seq += 1;
        self.pending_seq = Some(self.next_seq);
        FetchRequest {
            seq: self.next_seq,
            params: self.query_params(),
        }
    }

    /// Apply the outcome of a fetch.
    ///
    /// Only the most recently issued request may change state. A failure keeps
    /// the last good page and records the error.
    pub fn apply_response(&mut self, seq: u64, result: Result<PageResponse<R>, String>) -> ApplyOutcome {
        if self.pending_seq != Some(seq) {
            return ApplyOutcome::Stale;
        }
        self.pending_seq = None;

        match result {
            Ok(page) => {
                self.rows = page.data;
                self.server_total_pages = page.total_pages.max(1);
                self.server_total_count = page.total_count;
                self.pagination.page_index = page.current_page;
                self.pagination.page_size = page.page_size.max(1);
                self.pagination.clamp(self.server_total_pages);
                self.selection.clear();
                self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
                self.error = None;
                ApplyOutcome::Applied
            }
            Err(message) => {
                self.error = Some(message);
                ApplyOutcome::Failed
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selection.contains(&id)
    }

    pub fn toggle_row(&mut self, id: RowId) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    /// Toggle every row on the displayed page (never rows on other pages)
    pub fn toggle_all_on_page(&mut self) {
        let ids: Vec<RowId> = self.displayed_rows().iter().map(|r| r.row_id()).collect();
        if ids.is_empty() {
            return;
        }
        let all_selected = ids.iter().all(|id| self.selection.contains(id));
        for id in ids {
            if all_selected {
                self.selection.remove(&id);
            } else {
                self.selection.insert(id);
            }
        }
    }

    pub fn select_all_state(&self) -> SelectAllState {
        let rows = self.displayed_rows();
        let selected = rows
            .iter()
            .filter(|r| self.selection.contains(&r.row_id()))
            .count();
        if selected == 0 {
            SelectAllState::None
        } else if selected == rows.len() {
            SelectAllState::All
        } else {
            SelectAllState::Indeterminate
        }
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selection.iter().copied().collect()
    }

    /// Selected rows still held by the table
    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|r| self.selection.contains(&r.row_id()))
            .collect()
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Local Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop rows from local state after a delete
    pub fn remove_rows(&mut self, ids: &[RowId]) {
        let before = self.rows.len();
        self.rows.retain(|r| !ids.contains(&r.row_id()));
        let removed = before - self.rows.len();
        for id in ids {
            self.selection.remove(id);
        }
        if self.mode == TableMode::Server {
            self.server_total_count = self.server_total_count.saturating_sub(removed);
        }
        let total = self.total_pages();
        self.pagination.clamp(total);
        self.move_cursor(0);
    }

    /// Replace a row with the same id, or insert it at the top
    pub fn upsert_row(&mut self, row: R) {
        match self.rows.iter().position(|r| r.row_id() == row.row_id()) {
            Some(pos) => self.rows[pos] = row,
            None => self.rows.insert(0, row),
        }
    }

    /// Replace all client rows (client mode reload)
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.selection.clear();
        let total = self.total_pages();
        self.pagination.clamp(total);
        self.move_cursor(0);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl SortState {
    pub fn arrow(&self) -> &'static str {
        match self.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

/// Compare two rows by a column, honoring direction
pub fn compare_by<R: Record>(column: &Column<R>, direction: SortDirection, a: &R, b: &R) -> Ordering {
    let ord = column.raw(a).compare(&column.raw(b));
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::{text_input, FilterValue};
    use crate::model::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        age: i64,
    }

    impl Record for Person {
        const KEYS: &'static [&'static str] = &["id", "name", "age"];

        fn row_id(&self) -> RowId {
            self.id
        }

        fn value(&self, key: &str) -> Value {
            match key {
                "id" => Value::Int(self.id),
                "name" => Value::text(&self.name),
                "age" => Value::Int(self.age),
                _ => Value::Null,
            }
        }
    }

    fn person(id: i64, name: &str, age: i64) -> Person {
        Person {
            id,
            name: name.to_string(),
            age,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            person(1, "John", 40),
            person(2, "Amy", 25),
            person(3, "Joanna", 31),
            person(4, "Bob", 25),
            person(5, "Carla", 52),
        ]
    }

    fn names(rows: &[&Person]) -> Vec<String> {
        rows.iter().map(|p| p.name.clone()).collect()
    }

    fn client_table() -> TableState<Person> {
        TableState::client(Column::infer(), people(), 10).with_selection()
    }

    fn page(ids: &[i64], current_page: usize, total_pages: usize) -> PageResponse<Person> {
        PageResponse {
            data: ids.iter().map(|id| person(*id, &format!("P{}", id), 20)).collect(),
            total_pages,
            total_count: total_pages * ids.len(),
            current_page,
            page_size: ids.len(),
        }
    }

    #[test]
    fn test_text_filter_scenario() {
        let mut table = TableState::client(
            Column::infer(),
            vec![person(1, "John", 1), person(2, "Amy", 1), person(3, "Joanna", 1)],
            10,
        );
        table.set_filter("name", text_input("Jo"));
        assert_eq!(names(&table.displayed_rows()), vec!["John", "Joanna"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let mut table = client_table();
        table.set_filter("name", text_input("o"));
        table.set_filter("age", Some(FilterValue::Number(25.0)));
        assert_eq!(names(&table.filtered_rows()), vec!["Bob"]);

        table.clear_filters();
        assert_eq!(table.filtered_rows().len(), 5);
    }

    #[test]
    fn test_removing_each_filter_restores_full_set() {
        let mut table = client_table();
        table.set_filter("name", text_input("a"));
        table.set_filter("age", Some(FilterValue::Number(25.0)));
        table.set_filter("name", None);
        table.set_filter("age", None);
        assert_eq!(table.filtered_rows().len(), 5);
    }

    #[test]
    fn test_sort_cycle_returns_to_original_order() {
        let mut table = client_table();
        let original = names(&table.filtered_rows());

        table.toggle_sort("name");
        assert_eq!(
            names(&table.filtered_rows()),
            vec!["Amy", "Bob", "Carla", "Joanna", "John"]
        );
        table.toggle_sort("name");
        assert_eq!(
            names(&table.filtered_rows()),
            vec!["John", "Joanna", "Carla", "Bob", "Amy"]
        );
        table.toggle_sort("name");
        assert_eq!(names(&table.filtered_rows()), original);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut table = client_table();
        table.toggle_sort("age");
        let once = names(&table.filtered_rows());
        let again = names(&table.filtered_rows());
        assert_eq!(once, again);
        // equal ages keep their original relative order
        assert_eq!(once[0], "Amy");
        assert_eq!(once[1], "Bob");
    }

    #[test]
    fn test_actions_column_is_not_sortable() {
        let mut table = client_table().with_row_actions();
        assert_eq!(table.toggle_sort("actions"), None);
        assert!(table.sort().is_none());
        assert_eq!(table.columns().last().map(|c| c.kind), Some(ColumnKind::Actions));
    }

    #[test]
    fn test_displayed_rows_never_exceed_page_size() {
        let mut table = TableState::client(Column::infer(), people(), 2);
        assert_eq!(table.total_pages(), 3);
        for _ in 0..5 {
            assert!(table.displayed_rows().len() <= 2);
            table.next_page();
        }
        assert_eq!(table.pagination.page_index, 2);
        assert_eq!(table.displayed_rows().len(), 1);
    }

    #[test]
    fn test_filter_resets_page_and_index_stays_in_range() {
        let mut table = TableState::client(Column::infer(), people(), 2);
        table.go_to_page(2);
        table.set_filter("name", text_input("jo"));
        assert_eq!(table.pagination.page_index, 0);
        assert_eq!(table.total_pages(), 1);
        assert!(table.go_to_page(7).is_none());
        assert_eq!(table.pagination.page_index, 0);
    }

    #[test]
    fn test_navigation_reports_events() {
        let mut table = TableState::client(Column::infer(), people(), 2);
        let nav = table.next_page().unwrap();
        assert_eq!(
            nav.event,
            PageEvent::PageChanged {
                page_index: 1,
                page_size: 2
            }
        );
        assert_eq!(nav.fetch, None);
        assert!(table.previous_page().is_some());
        assert!(table.previous_page().is_none());
    }

    #[test]
    fn test_select_all_only_touches_displayed_page() {
        let mut table = TableState::client(Column::infer(), people(), 2).with_selection();
        table.toggle_all_on_page();
        assert_eq!(table.selected_ids(), vec![1, 2]);
        assert_eq!(table.select_all_state(), SelectAllState::All);

        table.next_page();
        assert_eq!(table.select_all_state(), SelectAllState::None);

        table.previous_page();
        table.toggle_all_on_page();
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_indeterminate_state() {
        let mut table = TableState::client(Column::infer(), people(), 2).with_selection();
        table.toggle_row(1);
        assert_eq!(table.select_all_state(), SelectAllState::Indeterminate);
        table.toggle_all_on_page();
        assert_eq!(table.select_all_state(), SelectAllState::All);
    }

    #[test]
    fn test_hidden_columns_excluded_from_export_columns() {
        let mut table = client_table().with_row_actions();
        table.toggle_column_visibility("age");
        let keys: Vec<&str> = table.export_columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name"]);
        assert!(table.visible_columns().iter().any(|c| c.key == "actions"));

        table.toggle_column_visibility("age");
        assert!(table.is_column_visible("age"));
    }

    #[test]
    fn test_server_mode_does_not_filter_locally() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        let fetch = table.set_filter("name", text_input("zzz")).unwrap();
        assert_eq!(table.displayed_rows().len(), 2);
        assert!(fetch
            .params
            .contains(&("name".to_string(), "zzz".to_string())));
        assert!(fetch.params.contains(&("page".to_string(), "0".to_string())));
    }

    #[test]
    fn test_server_navigation_issues_fetch_with_page() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        let nav = table.next_page().unwrap();
        let fetch = nav.fetch.unwrap();
        assert!(fetch.params.contains(&("page".to_string(), "1".to_string())));
        assert!(fetch.params.contains(&("pageSize".to_string(), "2".to_string())));
        assert!(table.is_loading());
    }

    #[test]
    fn test_server_sort_is_forwarded() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        let fetch = table.toggle_sort("name").unwrap();
        assert!(fetch.params.contains(&("sortBy".to_string(), "name".to_string())));
        assert!(fetch.params.contains(&("sortOrder".to_string(), "asc".to_string())));
    }

    #[test]
    fn test_server_page_size_change_clamps_to_total() {
        let mut table = TableState::server(
            Column::infer(),
            PageResponse {
                data: vec![person(5, "P5", 20)],
                total_pages: 5,
                total_count: 45,
                current_page: 4,
                page_size: 10,
            },
        );
        let fetch = table.set_page_size(50).unwrap().fetch.unwrap();
        assert!(fetch.params.contains(&("page".to_string(), "0".to_string())));
        assert!(fetch.params.contains(&("pageSize".to_string(), "50".to_string())));

        // a smaller size keeps a valid index
        let fetch = table.set_page_size(20).unwrap().fetch.unwrap();
        assert!(fetch.params.contains(&("page".to_string(), "0".to_string())));
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        let first = table.next_page().unwrap().fetch.unwrap();
        let second = table.next_page().unwrap().fetch.unwrap();

        // second resolves first, then the late first response arrives
        assert_eq!(
            table.apply_response(second.seq, Ok(page(&[1], 2, 3))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            table.apply_response(first.seq, Ok(page(&[3, 2], 1, 3))),
            ApplyOutcome::Stale
        );
        assert_eq!(table.displayed_rows()[0].id, 1);
        assert_eq!(table.pagination.page_index, 2);
    }

    #[test]
    fn test_failed_fetch_retains_last_good_page() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        let fetch = table.next_page().unwrap().fetch.unwrap();
        let outcome = table.apply_response(fetch.seq, Err("HTTP 500".to_string()));
        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(table.displayed_rows().len(), 2);
        assert_eq!(table.error.as_deref(), Some("HTTP 500"));
        assert!(!table.is_loading());
    }

    #[test]
    fn test_total_pages_from_server_is_authoritative() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3));
        assert_eq!(table.total_pages(), 3);
        let fetch = table.refresh().unwrap();
        table.apply_response(fetch.seq, Ok(page(&[5, 4], 0, 9)));
        assert_eq!(table.total_pages(), 9);
    }

    #[test]
    fn test_new_page_clears_selection() {
        let mut table = TableState::server(Column::infer(), page(&[5, 4], 0, 3)).with_selection();
        table.toggle_row(5);
        let fetch = table.next_page().unwrap().fetch.unwrap();
        table.apply_response(fetch.seq, Ok(page(&[3, 2], 1, 3)));
        assert_eq!(table.selection_len(), 0);
    }

    #[test]
    fn test_remove_rows_clears_their_selection() {
        let mut table = client_table();
        table.toggle_row(2);
        table.toggle_row(3);
        table.remove_rows(&[2, 3]);
        assert_eq!(table.selection_len(), 0);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_filter_callback_receives_full_mapping() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let config = crate::model::filter::FilterConfig::text("name", "Name").with_on_change(Arc::new(
            move |value: Option<&FilterValue>, all: &crate::model::filter::FilterState| {
                assert_eq!(value, Some(&FilterValue::Text("Jo".to_string())));
                assert_eq!(all.len(), 1);
                seen.fetch_add(1, AtomicOrdering::SeqCst);
            },
        ));
        let mut table = client_table().with_filters(vec![config]);
        table.set_filter("name", text_input("Jo"));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_compare_by_direction() {
        let column = Column::<Person>::new("age", "Age");
        let young = person(1, "a", 20);
        let old = person(2, "b", 60);
        assert_eq!(compare_by(&column, SortDirection::Asc, &young, &old), Ordering::Less);
        assert_eq!(compare_by(&column, SortDirection::Desc, &young, &old), Ordering::Greater);
    }
}
