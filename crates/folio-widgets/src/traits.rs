//! Trait definitions for page widgets.

use folio_markup::Element;

/// A build-time page widget mounted on a custom element tag.
pub trait PageWidget: Send + Sync {
    /// Custom element tag name this widget mounts on (e.g. `cv-contact`).
    fn tag_name(&self) -> &'static str;

    /// Mount the widget on one element instance.
    ///
    /// Runs once per instance while the pipeline processes the page. The
    /// widget owns the subtree exclusively for the duration of the call and
    /// mutates it in place. Missing optional sub-elements are skipped; there
    /// is no failure path.
    fn mount(&self, root: &mut Element);
}
