//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod confirm_dialog;
pub mod counter;
pub mod data_table;
pub mod filter_bar;
pub mod help_dialog;
pub mod layout;
pub mod menu_dialog;
pub mod news;
pub mod pagination_bar;
pub mod register;
pub mod user_form;

pub use confirm_dialog::ConfirmDialog;
pub use counter::CounterView;
pub use data_table::{DataTable, TableView};
pub use filter_bar::FilterEditor;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use menu_dialog::{MenuDialog, MenuItem};
pub use news::NewsView;
pub use register::RegisterForm;
pub use user_form::UserForm;
