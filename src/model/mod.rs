//! Model layer - centralized state management
//!
//! Records, table state (sorting, filtering, pagination, selection) and the
//! small demo models. Nothing here touches the terminal or the network.

pub mod column;
pub mod counter;
pub mod employee;
pub mod filter;
pub mod modal;
pub mod news;
pub mod pagination;
pub mod schema;
pub mod table;
pub mod ui;
pub mod user;
pub mod value;

