//! Form builder terminal user interface
//!
//! A dashboard of saved submissions, the builder with its live preview, and a
//! read-only viewer for a single submission.

pub mod app;
pub mod components;
pub mod screens;
pub mod traits;
pub mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use crate::config::Config;
use crate::storage::SqliteStore;

pub use app::{App, Route};
pub use ui::Theme;

/// Open the store, take over the terminal and run the app until the user quits
pub async fn run_tui(config: Config) -> Result<()> {
    let store = SqliteStore::new(config.database_path_str()).await?;
    let mut app = App::new(config, Box::new(store)).await?;

    info!("Starting form builder TUI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match &result {
        Ok(()) => info!("Form builder TUI exited"),
        Err(e) => error!("Form builder TUI encountered an error: {:#}", e),
    }
    result
}
