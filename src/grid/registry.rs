use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::grid::CellValue;
use crate::ui::widgets::graph::GraphEvent;

/// Callback handed to a renderer so the produced cell can push interaction
/// payloads back to the host. Fire-and-forget: the renderer never learns
/// whether anyone consumed the payload.
pub type SetData = Box<dyn FnMut(GraphEvent)>;

/// Builds one throwaway cell element per render pass.
pub type RendererFactory = Box<dyn Fn(CellProps) -> Box<dyn CellWidget>>;

/// Everything a renderer factory receives for one cell. The value is passed
/// through untouched; interpreting it is the produced element's concern.
pub struct CellProps {
    pub value: CellValue,
    pub set_data: Option<SetData>,
}

impl CellProps {
    pub fn new(value: CellValue) -> Self {
        CellProps {
            value,
            set_data: None,
        }
    }

    pub fn with_set_data(mut self, set_data: SetData) -> Self {
        self.set_data = Some(set_data);
        self
    }
}

/// A cell element produced by a renderer factory. Constructed fresh for every
/// render pass and for every routed click, so implementations stay stateless
/// between frames.
pub trait CellWidget {
    fn render(&self, area: Rect, buf: &mut Buffer);

    /// Invoked when the pointer goes down inside this cell's area.
    fn handle_click(&mut self, column: u16, row: u16, area: Rect) {
        let _ = (column, row, area);
    }
}

/// Named renderer factories, looked up by grid columns via the
/// `cell_renderer` name in their definition. Owned by whoever assembles the
/// grid options; nothing here is process-global.
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        RendererRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registers a factory under a name. Registering the same name again
    /// replaces the previous factory, which is how an application swaps a
    /// built-in renderer for its own variant.
    pub fn register(&mut self, name: impl Into<String>, factory: RendererFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn get(&self, name: &str) -> Option<&RendererFactory> {
        self.factories.get(name)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        RendererRegistry::new()
    }
}
