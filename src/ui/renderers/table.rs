use ratatui::{
    widgets::{Block, Borders, Paragraph},
    layout::{Layout, Constraint, Direction},
    style::{Style, Color},
    text::{Line, Span},
    Frame
};
use crate::grid::DataGrid;
use crate::types::App;

/// Render the commodity table view
pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Data grid
                Constraint::Length(3), // Footer / export notification
            ]
            .as_ref(),
        )
        .split(f.size());

    render_title(f, app, chunks[0]);

    let App {
        grid,
        grid_rows,
        grid_state,
        ..
    } = app;
    f.render_stateful_widget(DataGrid::new(grid, grid_rows), chunks[1], grid_state);

    render_footer(f, app, chunks[2]);
}

/// Render the title bar: row count, data source and load state
fn render_title(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let mut spans = vec![Span::raw(format!(
        "{} commodities | {}",
        app.rows.len(),
        app.data_label
    ))];
    if app.loading {
        spans.push(Span::styled(
            " | ⏳ loading...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &app.load_error {
        spans.push(Span::styled(
            format!(" | ⚠️ {}", error),
            Style::default().fg(Color::Red),
        ));
    }
    let title = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Sparkgrid").borders(Borders::ALL));
    f.render_widget(title, area);
}

/// Render the footer
fn render_footer(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(msg) = &app.export_notification {
        let notification = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Green))
            .block(
                Block::default()
                    .title("Export Status")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            );
        f.render_widget(notification, area);
    } else {
        let footer_text =
            "q: quit | ↑/↓: select | Enter: price history | e: export CSV | click a trend point";
        let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, area);
    }
}
