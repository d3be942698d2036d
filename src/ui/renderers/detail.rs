use ratatui::{
    widgets::{Block, Borders, Clear, Paragraph},
    layout::{Layout, Constraint, Direction, Rect},
    style::{Style, Color, Modifier},
    text::{Line, Span},
    Frame
};
use crate::data::CommodityRow;
use crate::grid::CellValue;
use crate::types::{App, DetailState};
use crate::ui::utils::{format_month, format_number};
use crate::ui::widgets::graph::Graph;

/// Render the price history overlay for the open commodity
pub fn render(f: &mut Frame, app: &App) {
    if let Some(detail) = &app.detail {
        if let Some(row) = app.rows.get(detail.row) {
            render_history(f, row, detail);
        }
    }
}

fn render_history(f: &mut Frame, row: &CommodityRow, detail: &DetailState) {
    let area = centered_rect(70, 80, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title("Price History")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(inner);

    // Full chart with axes; unlike the grid cells this one keeps the mode bar
    f.render_widget(
        Graph::new(CellValue::Figure(detail.figure.clone())),
        chunks[0],
    );

    render_readout(f, row, detail, chunks[1]);
}

/// Render the clicked point readout and key hint
fn render_readout(f: &mut Frame, row: &CommodityRow, detail: &DetailState, area: Rect) {
    let mut lines = Vec::new();
    if let Some(point) = &detail.clicked {
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(
                    "{}: {} {}",
                    format_month(point.x),
                    format_number(point.y, 2),
                    row.unit
                ),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "Esc: close",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines), area);
}

/// Centered rect taking the given percentage of the surrounding area
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
