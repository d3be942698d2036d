use std::time::Instant;

use serde::Serialize;

use crate::data::{self, CommodityRow};
use crate::figure::{price_history_figure, Figure};
use crate::grid::{GridOptions, GridRow, GridState};
use crate::ui::utils::{format_number, format_percent};
use crate::ui::widgets::graph::{ClickPoint, GraphEvent};

pub const NOTIFICATION_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Table,
    Detail,
}

/// State of the open price history view.
pub struct DetailState {
    pub row: usize,
    pub figure: Figure,
    /// Point that opened the view, when it came from a chart click.
    pub clicked: Option<ClickPoint>,
}

pub struct App {
    pub mode: AppMode,
    pub rows: Vec<CommodityRow>,
    pub grid_rows: Vec<GridRow>,
    pub grid: GridOptions,
    pub grid_state: GridState,
    pub detail: Option<DetailState>,
    pub data_label: String,
    pub loading: bool,
    pub load_error: Option<String>,
    pub export_notification: Option<String>,
    pub export_notification_time: Option<Instant>,
}

impl App {
    pub fn new(grid: GridOptions, data_label: &str) -> Self {
        App {
            mode: AppMode::Table,
            rows: Vec::new(),
            grid_rows: Vec::new(),
            grid,
            grid_state: GridState::default(),
            detail: None,
            data_label: data_label.to_string(),
            loading: true,
            load_error: None,
            export_notification: None,
            export_notification_time: None,
        }
    }

    /// Adds a streamed row. The first row pins the price column headers to
    /// the months actually present in the data.
    pub fn push_row(&mut self, row: CommodityRow) {
        if self.rows.is_empty() {
            if let Some(latest) = row.latest_date() {
                self.grid.columns = data::column_defs(Some(latest));
            }
        }
        self.grid_rows.push(row.to_grid_row());
        self.rows.push(row);
        if self.grid_state.selected.is_none() {
            self.grid_state.selected = Some(0);
        }
    }

    pub fn open_detail(&mut self, row: usize, clicked: Option<ClickPoint>) {
        if let Some(data_row) = self.rows.get(row) {
            let figure =
                price_history_figure(&data_row.product, &data_row.unit, &data_row.series);
            self.detail = Some(DetailState {
                row,
                figure,
                clicked,
            });
            self.grid_state.selected = Some(row);
            self.mode = AppMode::Detail;
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.mode = AppMode::Table;
    }

    /// Handles a payload relayed from an interactive chart cell: the clicked
    /// series names the commodity whose history to open. Payloads without
    /// click data or for unknown series are ignored.
    pub fn apply_graph_event(&mut self, event: GraphEvent) {
        if let Some(click) = event.click_data {
            if let Some(point) = click.points.first() {
                if let Some(index) = self.rows.iter().position(|r| r.product == point.series) {
                    self.open_detail(index, Some(point.clone()));
                }
            }
        }
    }
}

/// Row shape for `--json` output: everything pre-formatted for display.
#[derive(Serialize)]
pub struct CommodityRowFormatted {
    pub product: String,
    pub unit: String,
    pub price: String,
    pub price_prev_month: String,
    pub price_prev_year: String,
    pub mom_change: String,
    pub yoy_change: String,
}

impl From<&CommodityRow> for CommodityRowFormatted {
    fn from(row: &CommodityRow) -> Self {
        CommodityRowFormatted {
            product: row.product.clone(),
            unit: row.unit.clone(),
            price: format_number(row.price, 2),
            price_prev_month: format_number(row.price_prev_month, 2),
            price_prev_year: format_number(row.price_prev_year, 2),
            mom_change: format_percent(row.mom_change, 1),
            yoy_change: format_percent(row.yoy_change, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::register_builtin_renderers;
    use crate::ui::widgets::graph::ClickData;

    fn test_app() -> App {
        let mut grid = GridOptions::new("Commodities", data::column_defs(None));
        register_builtin_renderers(&mut grid.registry);
        App::new(grid, "built-in sample")
    }

    fn test_rows() -> Vec<CommodityRow> {
        let table = data::parse_cmo_csv(data::SAMPLE_CSV).unwrap();
        data::build_rows(&table)
    }

    #[test]
    fn first_row_pins_column_labels_and_selection() {
        let mut app = test_app();
        assert_eq!(app.grid.columns[2].header, "Latest");

        for row in test_rows() {
            app.push_row(row);
        }

        assert_eq!(app.grid.columns[2].header, "Nov 2024");
        assert_eq!(app.grid_state.selected, Some(0));
        assert_eq!(app.rows.len(), app.grid_rows.len());
    }

    #[test]
    fn chart_click_payload_opens_matching_detail() {
        let mut app = test_app();
        for row in test_rows() {
            app.push_row(row);
        }
        let target = app.rows[2].clone();

        app.apply_graph_event(GraphEvent {
            click_data: Some(ClickData {
                points: vec![ClickPoint {
                    series: target.product.clone(),
                    point_index: 4,
                    x: target.series[4].0,
                    y: target.series[4].1,
                }],
            }),
        });

        assert_eq!(app.mode, AppMode::Detail);
        let detail = app.detail.as_ref().expect("detail open");
        assert_eq!(detail.row, 2);
        assert!(detail.figure.layout.axes_visible);
        assert_eq!(detail.clicked.as_ref().unwrap().point_index, 4);
        assert_eq!(app.grid_state.selected, Some(2));
    }

    #[test]
    fn empty_payloads_and_unknown_series_are_ignored() {
        let mut app = test_app();
        for row in test_rows() {
            app.push_row(row);
        }

        app.apply_graph_event(GraphEvent { click_data: None });
        assert_eq!(app.mode, AppMode::Table);

        app.apply_graph_event(GraphEvent {
            click_data: Some(ClickData {
                points: vec![ClickPoint {
                    series: "No such commodity".to_string(),
                    point_index: 0,
                    x: 0.0,
                    y: 0.0,
                }],
            }),
        });
        assert_eq!(app.mode, AppMode::Table);
        assert!(app.detail.is_none());
    }

    #[test]
    fn close_detail_returns_to_table() {
        let mut app = test_app();
        for row in test_rows() {
            app.push_row(row);
        }
        app.open_detail(1, None);
        assert_eq!(app.mode, AppMode::Detail);
        app.close_detail();
        assert_eq!(app.mode, AppMode::Table);
        assert!(app.detail.is_none());
    }

    #[test]
    fn formatted_rows_carry_display_strings() {
        let rows = test_rows();
        let brent = rows
            .iter()
            .find(|r| r.product == "Crude oil, Brent")
            .unwrap();
        let formatted = CommodityRowFormatted::from(brent);
        assert_eq!(formatted.unit, "$/bbl");
        assert_eq!(formatted.price, "74.05");
        assert!(formatted.mom_change.ends_with('%'));
    }
}
