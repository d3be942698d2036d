pub mod input;
pub mod renderers;
pub mod terminal;
pub mod utils;
pub mod widgets;

use std::io;

use ratatui::{backend::CrosstermBackend, Terminal};

use crate::types::{App, AppMode};

// Re-export the main public functions
pub use terminal::{restore_terminal, setup_terminal};

/// Main UI rendering function that delegates to specific mode renderers
pub fn render_ui(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), io::Error> {
    terminal.draw(|f| match app.mode {
        AppMode::Table => renderers::table::render(f, app),
        AppMode::Detail => {
            // Keep the grid underneath so the history reads as an overlay
            renderers::table::render(f, app);
            renderers::detail::render(f, app);
        }
    })?;
    Ok(())
}
