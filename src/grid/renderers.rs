use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::grid::registry::{CellWidget, RendererFactory, RendererRegistry, SetData};
use crate::ui::widgets::graph::{Graph, GraphConfig, GraphEvent, GraphHook, GraphStyle};

/// Registry key for the chart cell renderer. The name is kept from the
/// browser dashboard this tool replaces, so column definitions and exported
/// payloads stay compatible.
pub const DCC_GRAPH_CLICK_DATA: &str = "DCC_GraphClickData";

/// Installs the stock renderers. Applications that want the interactive
/// chart cells register `graph_click_factory` over the same name afterwards.
pub fn register_builtin_renderers(registry: &mut RendererRegistry) {
    registry.register(DCC_GRAPH_CLICK_DATA, graph_factory());
}

/// Display-only chart cells: the figure fills the cell, no mode bar, clicks
/// are ignored.
pub fn graph_factory() -> RendererFactory {
    Box::new(|props| Box::new(GraphCell::new(props.value, None)))
}

/// Interactive chart cells. Clicks on chart points are relayed to the host
/// through the props' `set_data` callback; without one the cells behave like
/// the display-only variant.
pub fn graph_click_factory() -> RendererFactory {
    Box::new(|props| {
        let hook = props.set_data.map(click_data_hook);
        Box::new(GraphCell::new(props.value, hook))
    })
}

/// Wraps `set_data` in the forwarding rule for chart interactions: payloads
/// that carry click data go through unchanged, all others are dropped.
pub fn click_data_hook(mut set_data: SetData) -> GraphHook {
    Box::new(move |event: GraphEvent| {
        if event.click_data.is_some() {
            set_data(event);
        }
    })
}

/// Cell element wrapping the graph widget: height pinned to the full cell,
/// mode bar off. Built fresh for each render pass and each routed click.
struct GraphCell {
    graph: Graph,
    hook: Option<GraphHook>,
}

impl GraphCell {
    fn new(value: crate::grid::CellValue, hook: Option<GraphHook>) -> Self {
        GraphCell {
            graph: Graph::new(value)
                .style(GraphStyle::fill())
                .config(GraphConfig { display_mode_bar: false }),
            hook,
        }
    }
}

impl CellWidget for GraphCell {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.graph.draw(area, buf);
    }

    fn handle_click(&mut self, column: u16, row: u16, area: Rect) {
        let event = self.graph.click_payload(area, column, row);
        if let Some(hook) = &mut self.hook {
            hook(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use ratatui::style::Color;

    use crate::figure::{Figure, FigureLayout, Series, SeriesKind};
    use crate::grid::registry::CellProps;
    use crate::grid::CellValue;
    use crate::ui::widgets::graph::{ClickData, ClickPoint};

    fn single_point_value() -> CellValue {
        CellValue::Figure(Figure {
            series: vec![Series {
                name: "Coffee, Arabica".to_string(),
                kind: SeriesKind::Scatter,
                color: Color::Green,
                points: vec![(5.0, 5.0)],
            }],
            layout: FigureLayout::default(),
        })
    }

    fn recording_set_data() -> (SetData, Arc<Mutex<Vec<GraphEvent>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let set_data: SetData = Box::new(move |event| sink.lock().unwrap().push(event));
        (set_data, received)
    }

    fn point_event() -> GraphEvent {
        GraphEvent {
            click_data: Some(ClickData {
                points: vec![ClickPoint {
                    series: "Cocoa".to_string(),
                    point_index: 7,
                    x: 738000.0,
                    y: 3.25,
                }],
            }),
        }
    }

    #[test]
    fn builtin_registration_uses_the_compatibility_name() {
        let mut registry = RendererRegistry::new();
        register_builtin_renderers(&mut registry);
        assert_eq!(DCC_GRAPH_CLICK_DATA, "DCC_GraphClickData");
        assert!(registry.get(DCC_GRAPH_CLICK_DATA).is_some());
    }

    #[test]
    fn hook_forwards_events_with_click_data() {
        let (set_data, received) = recording_set_data();
        let mut hook = click_data_hook(set_data);

        hook(point_event());

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        // Payload goes through complete, not reduced
        assert_eq!(received[0], point_event());
    }

    #[test]
    fn hook_drops_events_without_click_data() {
        let (set_data, received) = recording_set_data();
        let mut hook = click_data_hook(set_data);

        hook(GraphEvent { click_data: None });
        hook(GraphEvent { click_data: None });

        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn hook_handles_mixed_sequences_in_order() {
        let (set_data, received) = recording_set_data();
        let mut hook = click_data_hook(set_data);

        hook(GraphEvent { click_data: None });
        hook(point_event());
        hook(GraphEvent { click_data: None });
        hook(point_event());

        assert_eq!(received.lock().unwrap().len(), 2);
    }

    #[test]
    fn interactive_cell_relays_point_clicks() {
        let (set_data, received) = recording_set_data();
        let factory = graph_click_factory();
        let mut cell = factory(CellProps::new(single_point_value()).with_set_data(set_data));

        let area = Rect::new(0, 0, 10, 4);
        // Same geometry as the widget tests: the point sits at column 5, row 2
        cell.handle_click(5, 2, area);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let click = received[0].click_data.as_ref().expect("payload kept");
        assert_eq!(click.points[0].series, "Coffee, Arabica");
    }

    #[test]
    fn interactive_cell_drops_misses() {
        let (set_data, received) = recording_set_data();
        let factory = graph_click_factory();
        let mut cell = factory(CellProps::new(single_point_value()).with_set_data(set_data));

        let area = Rect::new(0, 0, 10, 4);
        cell.handle_click(9, 0, area);

        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn interactive_cell_without_set_data_ignores_clicks() {
        let factory = graph_click_factory();
        let mut cell = factory(CellProps::new(single_point_value()));
        cell.handle_click(5, 2, Rect::new(0, 0, 10, 4));
    }

    #[test]
    fn display_cell_ignores_clicks() {
        let factory = graph_factory();
        let mut cell = factory(CellProps::new(single_point_value()));
        cell.handle_click(5, 2, Rect::new(0, 0, 10, 4));
    }

    #[test]
    fn chart_cell_draws_without_mode_bar() {
        let factory = graph_factory();
        let cell = factory(CellProps::new(single_point_value()));
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 3));
        cell.render(buf.area, &mut buf);
        let top: String = (0..20).map(|x| buf.get(x, 0).symbol().to_string()).collect();
        assert!(!top.contains("click a data point"));
    }

    #[test]
    fn chart_cell_tolerates_malformed_values() {
        let factory = graph_click_factory();
        let cell = factory(CellProps::new(CellValue::Text("not a figure".to_string())));
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 3));
        cell.render(buf.area, &mut buf);
    }
}
