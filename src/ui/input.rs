use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::export::export_table_to_csv;
use crate::types::{App, AppMode};

/// Handle keyboard input events for all application modes
pub fn handle_key_event(app: &mut App, key: KeyCode) -> bool {
    match app.mode {
        AppMode::Table => handle_table_mode_keys(app, key),
        AppMode::Detail => handle_detail_mode_keys(app, key),
    }
}

/// Handle key events in the table view
fn handle_table_mode_keys(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => return true,
        KeyCode::Up | KeyCode::Char('k') => app.grid_state.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.grid_state.select_next(app.rows.len()),
        KeyCode::Home => {
            if !app.rows.is_empty() {
                app.grid_state.selected = Some(0);
            }
        }
        KeyCode::End => {
            if !app.rows.is_empty() {
                app.grid_state.selected = Some(app.rows.len() - 1);
            }
        }
        KeyCode::Enter => {
            if let Some(selected) = app.grid_state.selected {
                app.open_detail(selected, None);
            }
        }
        KeyCode::Char('e') => {
            if let Err(e) = export_table_to_csv(app) {
                app.export_notification = Some(format!("❌ Export failed: {}", e));
                app.export_notification_time = Some(std::time::Instant::now());
            }
        }
        _ => {}
    }
    false
}

/// Handle key events in the price history view
fn handle_detail_mode_keys(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.close_detail(),
        _ => {}
    }
    false
}

/// Route mouse events. Clicks inside a chart cell go to a fresh cell element
/// from the column's renderer; clicks elsewhere in a row move the selection.
pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
    if app.mode != AppMode::Table {
        return;
    }
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_table_click(app, event.column, event.row)
        }
        MouseEventKind::ScrollUp => app.grid_state.select_previous(),
        MouseEventKind::ScrollDown => app.grid_state.select_next(app.rows.len()),
        _ => {}
    }
}

fn handle_table_click(app: &mut App, column: u16, row: u16) {
    let row_hit = app
        .grid_state
        .row_areas
        .iter()
        .find(|(_, area)| contains(*area, column, row))
        .map(|(index, _)| *index);
    if let Some(index) = row_hit {
        app.grid_state.selected = Some(index);
    }

    let cell_hit = app
        .grid_state
        .cell_hits
        .iter()
        .copied()
        .find(|hit| contains(hit.area, column, row));
    if let Some(hit) = cell_hit {
        let renderer = app
            .grid
            .columns
            .get(hit.col)
            .and_then(|c| c.cell_renderer.as_deref());
        if let Some(name) = renderer {
            if let Some(factory) = app.grid.registry.get(name) {
                if let Some(value) = app
                    .grid_rows
                    .get(hit.row)
                    .and_then(|r| r.cells.get(hit.col))
                {
                    let mut cell = factory(app.grid.cell_props(value.clone()));
                    cell.handle_click(column, row, hit.area);
                }
            }
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}
