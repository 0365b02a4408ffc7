//! Modal stack for managing overlays
//!
//! Overlays are an enum-based stack; only the top modal receives input.

use super::column::RowId;

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Delete confirmation for one or more rows
    ConfirmDelete { ids: Vec<RowId>, bulk: bool },
    /// Edit / Delete menu for the focused row
    RowActions { row_id: RowId, selected_index: usize },
    /// Menu over the current selection
    BulkActions { selected_index: usize },
    /// Export format picker
    Export {
        selected_only: bool,
        selected_index: usize,
    },
    /// Editor for one filter control
    FilterEditor { column: String },
    /// Column show/hide list
    ColumnVisibility { selected_index: usize },
    /// Create or edit a user
    UserForm { editing: Option<RowId> },
    /// Help dialog showing all keyboard shortcuts
    Help { scroll_offset: usize },
}

impl Modal {
    /// Number of entries in list-style modals
    pub fn option_count(&self) -> usize {
        match self {
            Modal::RowActions { .. } => RowMenuEntry::ALL.len(),
            Modal::BulkActions { .. } => BulkMenuEntry::ALL.len(),
            // CSV, XLSX, PDF
            Modal::Export { .. } => 3,
            _ => 0,
        }
    }

    /// Mutable cursor of list-style modals
    pub fn selected_index_mut(&mut self) -> Option<&mut usize> {
        match self {
            Modal::RowActions { selected_index, .. }
            | Modal::BulkActions { selected_index }
            | Modal::Export { selected_index, .. }
            | Modal::ColumnVisibility { selected_index } => Some(selected_index),
            _ => None,
        }
    }
}

/// Entries of the per-row menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMenuEntry {
    Edit,
    Delete,
}

impl RowMenuEntry {
    pub const ALL: [RowMenuEntry; 2] = [RowMenuEntry::Edit, RowMenuEntry::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            RowMenuEntry::Edit => "Edit",
            RowMenuEntry::Delete => "Delete",
        }
    }
}

/// Entries of the selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMenuEntry {
    Delete,
    Export,
    Clear,
}

impl BulkMenuEntry {
    pub const ALL: [BulkMenuEntry; 3] = [BulkMenuEntry::Delete, BulkMenuEntry::Export, BulkMenuEntry::Clear];

    pub fn label(&self) -> &'static str {
        match self {
            BulkMenuEntry::Delete => "Delete selected",
            BulkMenuEntry::Export => "Export selected",
            BulkMenuEntry::Clear => "Clear selection",
        }
    }
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Replace the top modal, e.g. when a menu leads to a confirmation
    pub fn replace_top(&mut self, modal: Modal) {
        self.stack.pop();
        self.stack.push(modal);
    }

    /// Move the cursor of a list modal, clamped to `[0, count-1]`
    pub fn move_selection(&mut self, delta: isize, count: usize) {
        if let Some(index) = self.top_mut().and_then(|m| m.selected_index_mut()) {
            if count == 0 {
                *index = 0;
                return;
            }
            let next = *index as isize + delta;
            *index = next.clamp(0, count as isize - 1) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.push(Modal::QuitConfirm);
        stack.push(Modal::Help { scroll_offset: 0 });

        assert_eq!(stack.pop(), Some(Modal::Help { scroll_offset: 0 }));
        assert_eq!(stack.pop(), Some(Modal::QuitConfirm));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_replace_top_keeps_depth() {
        let mut stack = ModalStack::new();
        stack.push(Modal::RowActions {
            row_id: 4,
            selected_index: 1,
        });
        stack.replace_top(Modal::ConfirmDelete {
            ids: vec![4],
            bulk: false,
        });
        assert_eq!(
            stack.top(),
            Some(&Modal::ConfirmDelete {
                ids: vec![4],
                bulk: false
            })
        );
        stack.pop();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut stack = ModalStack::new();
        stack.push(Modal::BulkActions { selected_index: 0 });

        stack.move_selection(-1, 3);
        assert_eq!(stack.top(), Some(&Modal::BulkActions { selected_index: 0 }));

        stack.move_selection(5, 3);
        assert_eq!(stack.top(), Some(&Modal::BulkActions { selected_index: 2 }));
    }

    #[test]
    fn test_move_selection_ignores_non_list_modals() {
        let mut stack = ModalStack::new();
        stack.push(Modal::QuitConfirm);
        stack.move_selection(1, 3);
        assert_eq!(stack.top(), Some(&Modal::QuitConfirm));
    }
}
