use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget};
use serde::{Deserialize, Serialize};

use crate::figure::{Figure, SeriesKind};
use crate::grid::CellValue;
use crate::ui::utils::{format_month, format_number};

/// Payload produced when a point inside the graph is clicked. Serializes with
/// the same key names emitted by browser charting libraries, so exported
/// payloads stay recognizable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEvent {
    pub click_data: Option<ClickData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    pub points: Vec<ClickPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPoint {
    pub series: String,
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
}

/// Callback a graph host installs to receive interaction payloads.
pub type GraphHook = Box<dyn FnMut(GraphEvent)>;

/// Visual constraints applied to the graph inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStyle {
    /// Percentage of the container height the plot may use, top-aligned.
    pub height_percent: u16,
}

impl Default for GraphStyle {
    fn default() -> Self {
        GraphStyle { height_percent: 100 }
    }
}

impl GraphStyle {
    pub fn fill() -> Self {
        GraphStyle { height_percent: 100 }
    }
}

/// Behavioral switches, mirroring the config object of the browser widget
/// this replaces. The mode bar is a one-line interaction hint above the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    pub display_mode_bar: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig { display_mode_bar: true }
    }
}

/// Chart widget. Takes the cell value untouched and decides for itself how to
/// present it: figures are plotted, anything else gets a placeholder.
pub struct Graph {
    value: CellValue,
    style: GraphStyle,
    config: GraphConfig,
}

impl Graph {
    pub fn new(value: CellValue) -> Self {
        Graph {
            value,
            style: GraphStyle::default(),
            config: GraphConfig::default(),
        }
    }

    pub fn style(mut self, style: GraphStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn draw(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (bar, plot) = self.split_area(area);
        if let Some(bar) = bar {
            Paragraph::new("click a data point to inspect ")
                .alignment(Alignment::Right)
                .style(Style::default().fg(Color::DarkGray))
                .render(bar, buf);
        }
        let figure = match &self.value {
            CellValue::Figure(figure) => figure,
            _ => {
                self.draw_placeholder(plot, buf);
                return;
            }
        };
        if figure.is_empty() || plot.width == 0 || plot.height == 0 {
            return;
        }
        if figure.layout.axes_visible {
            self.draw_chart(figure, plot, buf);
        } else {
            self.draw_canvas(figure, plot, buf);
        }
    }

    /// Maps a click at terminal cell (column, row) to the nearest data point.
    /// Points further than one cell away in either direction do not match and
    /// the payload carries no click data.
    pub fn click_payload(&self, area: Rect, column: u16, row: u16) -> GraphEvent {
        let (_, plot) = self.split_area(area);
        let figure = match &self.value {
            CellValue::Figure(figure) if !figure.is_empty() => figure,
            _ => return GraphEvent { click_data: None },
        };
        if plot.width == 0
            || plot.height == 0
            || column < plot.x
            || column >= plot.x + plot.width
            || row < plot.y
            || row >= plot.y + plot.height
        {
            return GraphEvent { click_data: None };
        }

        let [x0, x1] = figure.x_bounds();
        let [y0, y1] = figure.y_bounds();
        let dx = (x1 - x0) / plot.width as f64;
        let dy = (y1 - y0) / plot.height as f64;

        let mut best: Option<(u32, ClickPoint)> = None;
        for series in &figure.series {
            for (index, &(px, py)) in series.points.iter().enumerate() {
                let pcol = plot.x + (((px - x0) / dx) as u16).min(plot.width - 1);
                let prow = plot.y + (((y1 - py) / dy) as u16).min(plot.height - 1);
                let dcol = pcol.abs_diff(column) as u32;
                let drow = prow.abs_diff(row) as u32;
                if dcol > 1 || drow > 1 {
                    continue;
                }
                let distance = dcol * dcol + drow * drow;
                let closer = match &best {
                    Some((current, _)) => distance < *current,
                    None => true,
                };
                if closer {
                    best = Some((
                        distance,
                        ClickPoint {
                            series: series.name.clone(),
                            point_index: index,
                            x: px,
                            y: py,
                        },
                    ));
                }
            }
        }

        GraphEvent {
            click_data: best.map(|(_, point)| ClickData { points: vec![point] }),
        }
    }

    /// Applies the height constraint, then carves off the mode bar line.
    fn split_area(&self, area: Rect) -> (Option<Rect>, Rect) {
        let percent = self.style.height_percent.clamp(1, 100);
        let height = ((area.height as u32 * percent as u32) / 100).max(1) as u16;
        let mut plot = Rect { height, ..area };
        if self.config.display_mode_bar && plot.height >= 2 {
            let bar = Rect { height: 1, ..plot };
            plot.y += 1;
            plot.height -= 1;
            (Some(bar), plot)
        } else {
            (None, plot)
        }
    }

    fn draw_placeholder(&self, area: Rect, buf: &mut Buffer) {
        let text = "n/a";
        let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
        let y = area.y + area.height / 2;
        buf.set_stringn(
            x,
            y,
            text,
            area.width as usize,
            Style::default().fg(Color::DarkGray),
        );
    }

    fn draw_canvas(&self, figure: &Figure, area: Rect, buf: &mut Buffer) {
        let [x0, x1] = figure.x_bounds();
        let [y0, y1] = figure.y_bounds();
        let canvas = Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([x0, x1])
            .y_bounds([y0, y1])
            .paint(|ctx| {
                if let Some(baseline) = figure.layout.baseline {
                    // Dotted reference line: every other braille column
                    let steps = (area.width as usize * 2).max(2);
                    let dots: Vec<(f64, f64)> = (0..steps)
                        .step_by(2)
                        .map(|i| (x0 + (x1 - x0) * i as f64 / steps as f64, baseline))
                        .collect();
                    ctx.draw(&Points {
                        coords: &dots,
                        color: Color::DarkGray,
                    });
                }
                for series in &figure.series {
                    match series.kind {
                        SeriesKind::Line => {
                            for pair in series.points.windows(2) {
                                ctx.draw(&CanvasLine {
                                    x1: pair[0].0,
                                    y1: pair[0].1,
                                    x2: pair[1].0,
                                    y2: pair[1].1,
                                    color: series.color,
                                });
                            }
                        }
                        SeriesKind::Scatter => {
                            ctx.draw(&Points {
                                coords: &series.points,
                                color: series.color,
                            });
                        }
                    }
                }
            });
        canvas.render(area, buf);
    }

    fn draw_chart(&self, figure: &Figure, area: Rect, buf: &mut Buffer) {
        let [x0, x1] = figure.x_bounds();
        let [y0, y1] = figure.y_bounds();

        let datasets: Vec<Dataset> = figure
            .series
            .iter()
            .map(|series| {
                let (marker, graph_type) = match series.kind {
                    SeriesKind::Line => (symbols::Marker::Braille, GraphType::Line),
                    SeriesKind::Scatter => (symbols::Marker::Dot, GraphType::Scatter),
                };
                Dataset::default()
                    .marker(marker)
                    .graph_type(graph_type)
                    .style(Style::default().fg(series.color))
                    .data(&series.points)
            })
            .collect();

        // x values are days since the common era
        let x_labels: Vec<Span> = [x0, (x0 + x1) / 2.0, x1]
            .iter()
            .map(|&x| Span::from(format_month(x)))
            .collect();
        let y_labels: Vec<Span> = (0..=4)
            .map(|i| Span::from(format_number(y0 + (y1 - y0) * i as f64 / 4.0, 1)))
            .collect();

        let x_axis = Axis::default()
            .bounds([x0, x1])
            .labels(x_labels)
            .labels_alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray));
        let mut y_axis = Axis::default()
            .bounds([y0, y1])
            .labels(y_labels)
            .style(Style::default().fg(Color::DarkGray));
        if let Some(unit) = &figure.layout.y_title {
            y_axis = y_axis.title(Span::styled(
                unit.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }

        let mut chart = Chart::new(datasets).x_axis(x_axis).y_axis(y_axis);
        if let Some(title) = &figure.layout.title {
            chart = chart.block(
                Block::default()
                    .title(title.clone())
                    .borders(Borders::ALL),
            );
        }
        chart.render(area, buf);
    }
}

impl Widget for Graph {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.draw(area, buf);
    }
}
