//! users-admin - A users admin service and terminal UI
//!
//! `serve` runs the HTTP JSON endpoints over a SQLite users table,
//! `tui` (the default) is the admin interface built on the Component
//! Architecture pattern from ratatui, and `seed` fills the table with
//! generated users.

mod action;
mod app;
mod component;
mod components;
mod config;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::{Config, ConfigError};
use crate::services::server::{self, ServerState};
use crate::services::{seed, ApiClient, UserStore};
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::Event;
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{ColorChoice, TermLogger, TerminalMode, WriteLogger};
use std::fs::{self, File};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "users-admin")]
#[command(about = "Users admin service and terminal UI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (defaults to ~/.users-admin/config.json)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the users, employee, news and register endpoints
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// SQLite database file
        #[arg(short, long)]
        database: Option<String>,

        /// Employee directory JSON file
        #[arg(long)]
        employees: Option<String>,
    },

    /// Run the terminal admin UI
    Tui {
        /// Base URL of a running `serve`
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Insert generated users into the database
    Seed {
        /// Number of users to insert
        #[arg(short = 'n', long, default_value_t = 1000)]
        count: usize,

        /// Rows per insert transaction
        #[arg(long, default_value_t = 500)]
        batch_size: usize,

        /// SQLite database file
        #[arg(short, long)]
        database: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // an explicit --config must parse; the default file falls back to defaults
    let config_path = cli.config.clone().or_else(Config::config_path);
    let (mut config, load_error) = match cli.config {
        Some(ref path) => (Config::load_from(path)?, None),
        None => Config::load_or_default(config_path.as_deref()),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    match cli.command.unwrap_or(Command::Tui { api_url: None }) {
        Command::Serve {
            bind,
            database,
            employees,
        } => {
            config.bind_address = bind.unwrap_or(config.bind_address);
            config.database_path = database.unwrap_or(config.database_path);
            config.employees_path = employees.unwrap_or(config.employees_path);
            init_term_logger(config.level_filter())?;
            report_load_error(load_error);
            run_server(&config)
        }
        Command::Seed {
            count,
            batch_size,
            database,
        } => {
            config.database_path = database.unwrap_or(config.database_path);
            init_term_logger(config.level_filter())?;
            report_load_error(load_error);
            run_seed(&config, count, batch_size)
        }
        Command::Tui { api_url } => {
            let overridden = api_url.is_some();
            config.api_base_url = api_url.unwrap_or(config.api_base_url);
            init_file_logger(&config)?;
            report_load_error(load_error);
            // keep one-off overrides out of the saved preferences
            let save_path = if overridden { None } else { config_path };
            run_tui(config, save_path)
        }
    }
}

fn init_term_logger(level: LevelFilter) -> Result<()> {
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    Ok(())
}

/// Config errors surface only after a logger exists to carry them
fn report_load_error(error: Option<ConfigError>) {
    if let Some(e) = error {
        warn!("{}; using defaults", e);
    }
}

/// The terminal belongs to the UI, so its log goes to a file
fn init_file_logger(config: &Config) -> Result<()> {
    let path = config.log_file();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    WriteLogger::init(config.level_filter(), simplelog::Config::default(), file)?;
    Ok(())
}

fn run_server(config: &Config) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address))?;
    let store = UserStore::open(&config.database_path)
        .with_context(|| format!("failed to open database {}", config.database_path))?;
    info!("Using database {}", config.database_path);

    let state = Arc::new(ServerState::new(store, PathBuf::from(&config.employees_path)));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(state, addr))
}

fn run_seed(config: &Config, count: usize, batch_size: usize) -> Result<()> {
    let mut store = UserStore::open(&config.database_path)
        .with_context(|| format!("failed to open database {}", config.database_path))?;
    let mut rng = StdRng::from_os_rng();
    let inserted = seed::seed_users(&mut store, &mut rng, count, batch_size)?;
    info!("{} now holds {} users", config.database_path, store.count()?);
    if inserted < count {
        warn!("Only {} of {} users were inserted", inserted, count);
    }
    Ok(())
}

fn run_tui(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let client = ApiClient::new(&config.api_base_url)?;
    info!("Connecting to {}", config.api_base_url);

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Create app state
    let mut app = App::new(config, client).with_config_path(config_path);
    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        log::error!("Exiting with error: {:?}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                log::error!("Draw error: {}", e);
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Process the action
            if let Some(action) = action {
                // Action might produce a follow-up action
                let mut current_action = Some(action);
                while let Some(a) = current_action {
                    current_action = app.update(a)?;
                }
            }
        } else {
            // No event - send a tick for polling and timers
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
