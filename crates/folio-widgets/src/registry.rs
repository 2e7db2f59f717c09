//! Widget registry for applying widgets across a page.

use folio_markup::Document;

use crate::traits::PageWidget;

/// A registry of page widgets keyed by their custom element tag.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: Vec<Box<dyn PageWidget>>,
}

impl WidgetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget.
    pub fn register<W: PageWidget + 'static>(&mut self, widget: W) {
        self.widgets.push(Box::new(widget));
    }

    /// Registered custom element tag names.
    pub fn tag_names(&self) -> Vec<&'static str> {
        self.widgets.iter().map(|w| w.tag_name()).collect()
    }

    /// Mount every registered widget on each matching element in the
    /// document. Returns the number of mounts performed.
    pub fn apply(&self, doc: &mut Document) -> usize {
        let mut mounted = 0;
        for widget in &self.widgets {
            mounted += doc.for_each_element_mut(widget.tag_name(), |el| widget.mount(el));
        }
        mounted
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("tags", &self.tag_names())
            .finish()
    }
}
