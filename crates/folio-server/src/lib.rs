//! Local preview server and source watcher for résumé pages.

pub mod server;
pub mod watcher;

pub use server::{PreviewServer, ServeConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
