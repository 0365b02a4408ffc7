//! Services: storage, HTTP and background work
//!
//! - SQLite user store and seeding
//! - HTTP endpoints and the blocking API client
//! - Background request runner for the TUI
//! - Row export (CSV, XLSX, PDF)

pub mod api_client;
pub mod employees;
pub mod export;
pub mod fetch_runner;
pub mod news;
pub mod seed;
pub mod server;
pub mod store;

pub use api_client::ApiClient;
pub use export::{ExportFormat, ExportScope};
pub use fetch_runner::{ApiMessage, ApiRequest, FetchRunner};
pub use store::UserStore;
