//! Build pipeline for résumé pages.
//!
//! Named tasks (`webpack`, `minify`, `vulcanize`, `default`) are organized
//! as a dependency graph and executed by a topologically sorting runner
//! that halts dependents on the first failure.

pub mod builder;
pub mod bundle;
pub mod graph;
pub mod minify;
pub mod vulcanize;

pub use builder::{BuildConfig, BuildResult, SiteBuilder};
pub use bundle::{Bundle, BundleError};
pub use graph::{GraphError, TaskGraph, TaskResult};
pub use minify::MinifyError;
pub use vulcanize::VulcanizeError;
