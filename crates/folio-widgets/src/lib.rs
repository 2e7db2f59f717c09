//! Build-time page widgets for résumé pages.
//!
//! Widgets mount on custom element tags while the pipeline processes the
//! page markup, personalizing content according to the configured branding.

pub mod branding;
pub mod contact;
pub mod registry;
pub mod traits;

pub use branding::Branding;
pub use contact::ContactWidget;
pub use registry::WidgetRegistry;
pub use traits::PageWidget;
