//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::column::RowId;
use crate::model::filter::FilterValue;
use crate::model::table::FetchRequest;
use crate::model::user::NewUser;
use crate::services::export::ExportFormat;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for polling and timers
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move to next row
    NextItem,
    /// Move to previous row
    PrevItem,
    /// Jump to first row of the page
    FirstItem,
    /// Jump to last row of the page
    LastItem,
    NextTab,
    PrevTab,
    /// Focus the next column (sorting target)
    NextColumn,
    PrevColumn,

    // ─────────────────────────────────────────────────────────────────────────
    // Pagination
    // ─────────────────────────────────────────────────────────────────────────
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Step through the page size choices
    CyclePageSize,
    /// Switch between simple and numbered pagination
    TogglePaginationTheme,

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting & Filtering
    // ─────────────────────────────────────────────────────────────────────────
    /// Cycle sort on the focused column
    ToggleSort,
    /// Focus the next filter control
    NextFilter,
    /// Open the editor of the focused filter
    OpenFilterEditor,
    /// Apply a normalized filter value (None clears it)
    SetFilter {
        column: String,
        value: Option<FilterValue>,
    },
    ClearFilters,

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────
    ToggleRowSelection,
    /// Select or deselect every row of the displayed page
    ToggleSelectAll,
    ClearSelection,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    OpenRowActions,
    OpenBulkActions,
    OpenExport,
    OpenColumnVisibility,
    OpenCreateUser,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,
    /// Navigate up in modal (e.g., previous option)
    ModalUp,
    /// Navigate down in modal (e.g., next option)
    ModalDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────
    /// Reload the data behind the active tab
    Refresh,
    /// A server page the users table needs
    FetchPage(FetchRequest),
    /// Show or hide a column by key
    ToggleColumn(String),
    Export {
        format: ExportFormat,
        selected_only: bool,
    },
    /// Confirmed deletion
    DeleteRows(Vec<RowId>),
    /// Submit the user form
    SaveUser {
        editing: Option<RowId>,
        user: NewUser,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Demo Views
    // ─────────────────────────────────────────────────────────────────────────
    Increment,
    Decrement,
    AddBy(i64),
    SubmitRegister,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::NextTab => write!(f, "NextTab"),
            Action::PrevTab => write!(f, "PrevTab"),
            Action::NextColumn => write!(f, "NextColumn"),
            Action::PrevColumn => write!(f, "PrevColumn"),
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::FirstPage => write!(f, "FirstPage"),
            Action::LastPage => write!(f, "LastPage"),
            Action::CyclePageSize => write!(f, "CyclePageSize"),
            Action::TogglePaginationTheme => write!(f, "TogglePaginationTheme"),
            Action::ToggleSort => write!(f, "ToggleSort"),
            Action::NextFilter => write!(f, "NextFilter"),
            Action::OpenFilterEditor => write!(f, "OpenFilterEditor"),
            Action::SetFilter { column, value } => match value {
                Some(v) => write!(f, "SetFilter({}={})", column, v.summary()),
                None => write!(f, "SetFilter({}=none)", column),
            },
            Action::ClearFilters => write!(f, "ClearFilters"),
            Action::ToggleRowSelection => write!(f, "ToggleRowSelection"),
            Action::ToggleSelectAll => write!(f, "ToggleSelectAll"),
            Action::ClearSelection => write!(f, "ClearSelection"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenRowActions => write!(f, "OpenRowActions"),
            Action::OpenBulkActions => write!(f, "OpenBulkActions"),
            Action::OpenExport => write!(f, "OpenExport"),
            Action::OpenColumnVisibility => write!(f, "OpenColumnVisibility"),
            Action::OpenCreateUser => write!(f, "OpenCreateUser"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
            Action::Refresh => write!(f, "Refresh"),
            Action::FetchPage(request) => write!(f, "FetchPage(#{})", request.seq),
            Action::ToggleColumn(key) => write!(f, "ToggleColumn({})", key),
            Action::Export {
                format,
                selected_only,
            } => write!(f, "Export({}, selected_only={})", format.extension(), selected_only),
            Action::DeleteRows(ids) => write!(f, "DeleteRows({:?})", ids),
            Action::SaveUser { editing, .. } => match editing {
                Some(id) => write!(f, "SaveUser(#{})", id),
                None => write!(f, "SaveUser(new)"),
            },
            Action::Increment => write!(f, "Increment"),
            Action::Decrement => write!(f, "Decrement"),
            Action::AddBy(n) => write!(f, "AddBy({})", n),
            Action::SubmitRegister => write!(f, "SubmitRegister"),
        }
    }
}
