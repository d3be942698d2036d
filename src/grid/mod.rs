pub mod registry;
pub mod renderers;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, StatefulWidget, Widget};
use tokio::sync::mpsc::UnboundedSender;

use crate::figure::Figure;
use crate::ui::utils::{format_number, format_percent};
use crate::ui::widgets::graph::GraphEvent;

pub use registry::{CellProps, CellWidget, RendererFactory, RendererRegistry, SetData};
pub use renderers::{
    click_data_hook, graph_click_factory, graph_factory, register_builtin_renderers,
    DCC_GRAPH_CLICK_DATA,
};

pub const DEFAULT_ROW_HEIGHT: u16 = 3;

/// One grid cell. Values are opaque to the grid itself: text and numbers are
/// formatted per column definition, figures are handed to the column's
/// renderer untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Figure(Figure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlign {
    Left,
    Right,
}

/// How a numeric cell is turned into text. The digit counts are decimal
/// places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Text,
    Number(usize),
    Percent(usize),
}

/// Conditional cell styling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRule {
    None,
    /// Positive numbers green, negative numbers red.
    PosNeg,
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub header: String,
    pub width: Constraint,
    pub align: CellAlign,
    pub format: ValueFormat,
    pub style_rule: StyleRule,
    /// Name of a registered cell renderer. Columns without one render their
    /// values as formatted text.
    pub cell_renderer: Option<String>,
}

impl ColumnDef {
    pub fn new(header: impl Into<String>, width: Constraint) -> Self {
        ColumnDef {
            header: header.into(),
            width,
            align: CellAlign::Left,
            format: ValueFormat::Text,
            style_rule: StyleRule::None,
            cell_renderer: None,
        }
    }

    pub fn align(mut self, align: CellAlign) -> Self {
        self.align = align;
        self
    }

    pub fn format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    pub fn style_rule(mut self, rule: StyleRule) -> Self {
        self.style_rule = rule;
        self
    }

    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.cell_renderer = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub cells: Vec<CellValue>,
}

impl GridRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        GridRow { cells }
    }
}

/// Grid configuration assembled once at startup. Owns the renderer registry;
/// cells reach the host only through the `sync` channel endpoint handed out
/// via `cell_props`.
pub struct GridOptions {
    pub title: String,
    pub columns: Vec<ColumnDef>,
    pub row_height: u16,
    pub registry: RendererRegistry,
    pub sync: Option<UnboundedSender<GraphEvent>>,
}

impl GridOptions {
    pub fn new(title: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        GridOptions {
            title: title.into(),
            columns,
            row_height: DEFAULT_ROW_HEIGHT,
            registry: RendererRegistry::new(),
            sync: None,
        }
    }

    /// Builds the props for one cell, minting a fresh `set_data` wired to the
    /// sync channel when one is configured. Send failures are ignored; a
    /// closed receiver just means nobody is listening anymore.
    pub fn cell_props(&self, value: CellValue) -> CellProps {
        let props = CellProps::new(value);
        match &self.sync {
            Some(sender) => {
                let sender = sender.clone();
                props.with_set_data(Box::new(move |event| {
                    let _ = sender.send(event);
                }))
            }
            None => props,
        }
    }
}

/// Screen region a renderer-drawn cell occupied during the last render pass.
/// Used to route mouse clicks back to the owning cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHit {
    pub row: usize,
    pub col: usize,
    pub area: Rect,
}

#[derive(Debug, Default)]
pub struct GridState {
    pub offset: usize,
    pub selected: Option<usize>,
    pub cell_hits: Vec<CellHit>,
    pub row_areas: Vec<(usize, Rect)>,
}

impl GridState {
    pub fn select_next(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(current) => (current + 1).min(total - 1),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        self.selected = Some(match self.selected {
            Some(current) => current.saturating_sub(1),
            None => 0,
        });
    }

    fn clamp_scroll(&mut self, total: usize, visible: usize) {
        if visible == 0 {
            return;
        }
        let max_offset = total.saturating_sub(visible);
        if self.offset > max_offset {
            self.offset = max_offset;
        }
        if let Some(selected) = self.selected {
            if selected < self.offset {
                self.offset = selected;
            } else if selected >= self.offset + visible {
                self.offset = selected + 1 - visible;
            }
        }
    }
}

/// The data grid. Stateless itself; scroll position, selection and the
/// per-frame hit map live in `GridState`.
pub struct DataGrid<'a> {
    options: &'a GridOptions,
    rows: &'a [GridRow],
}

impl<'a> DataGrid<'a> {
    pub fn new(options: &'a GridOptions, rows: &'a [GridRow]) -> Self {
        DataGrid { options, rows }
    }

    fn column_areas(&self, band: Rect) -> Vec<Rect> {
        let widths: Vec<Constraint> = self.options.columns.iter().map(|c| c.width).collect();
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(band)
            .to_vec()
    }
}

impl StatefulWidget for DataGrid<'_> {
    type State = GridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GridState) {
        state.cell_hits.clear();
        state.row_areas.clear();

        let block = Block::default()
            .title(self.options.title.clone())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 || inner.width == 0 || self.options.columns.is_empty() {
            return;
        }

        let header_band = Rect { height: 1, ..inner };
        let header_style = Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD);
        for (column, cell_area) in self
            .options
            .columns
            .iter()
            .zip(self.column_areas(header_band))
        {
            draw_aligned(&column.header, column.align, cell_area, buf, header_style);
        }

        let rows_area = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };
        let row_height = self.options.row_height.max(1);
        let visible = (rows_area.height / row_height) as usize;
        state.clamp_scroll(self.rows.len(), visible);

        for (index, row) in self
            .rows
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(visible)
        {
            let band = Rect {
                y: rows_area.y + ((index - state.offset) as u16) * row_height,
                height: row_height,
                ..rows_area
            };
            if state.selected == Some(index) {
                buf.set_style(band, Style::default().bg(Color::DarkGray));
            }
            state.row_areas.push((index, band));

            for (col_index, (column, cell_area)) in self
                .options
                .columns
                .iter()
                .zip(self.column_areas(band))
                .enumerate()
            {
                let value = row.cells.get(col_index).unwrap_or(&CellValue::Empty);
                match &column.cell_renderer {
                    Some(name) => match self.options.registry.get(name) {
                        Some(factory) => {
                            let cell = factory(self.options.cell_props(value.clone()));
                            cell.render(cell_area, buf);
                            state.cell_hits.push(CellHit {
                                row: index,
                                col: col_index,
                                area: cell_area,
                            });
                        }
                        None => {
                            draw_aligned(
                                "?",
                                CellAlign::Left,
                                middle_line(cell_area),
                                buf,
                                Style::default().fg(Color::DarkGray),
                            );
                        }
                    },
                    None => {
                        let text = text_for(column, value);
                        if !text.is_empty() {
                            draw_aligned(
                                &text,
                                column.align,
                                middle_line(cell_area),
                                buf,
                                style_for(column, value),
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Formats a cell value according to its column definition.
pub fn text_for(column: &ColumnDef, value: &CellValue) -> String {
    match value {
        CellValue::Empty | CellValue::Figure(_) => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Number(number) => match column.format {
            ValueFormat::Number(decimals) => format_number(*number, decimals),
            ValueFormat::Percent(decimals) => format_percent(*number, decimals),
            ValueFormat::Text => format_number(*number, 2),
        },
    }
}

/// Resolves the conditional style for a cell value.
pub fn style_for(column: &ColumnDef, value: &CellValue) -> Style {
    match (column.style_rule, value) {
        (StyleRule::PosNeg, CellValue::Number(number)) if *number > 0.0 => {
            Style::default().fg(Color::Green)
        }
        (StyleRule::PosNeg, CellValue::Number(number)) if *number < 0.0 => {
            Style::default().fg(Color::Red)
        }
        _ => Style::default(),
    }
}

fn middle_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: 1.min(area.height),
        ..area
    }
}

fn draw_aligned(text: &str, align: CellAlign, area: Rect, buf: &mut Buffer, style: Style) {
    if area.width < 3 || area.height == 0 {
        return;
    }
    let avail = (area.width - 2) as usize;
    let shown = text.chars().count().min(avail);
    let x = match align {
        CellAlign::Left => area.x + 1,
        CellAlign::Right => area.x + 1 + (avail - shown) as u16,
    };
    buf.set_stringn(x, area.y, text, avail, style);
}
