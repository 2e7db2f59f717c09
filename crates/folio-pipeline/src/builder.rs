//! Site build orchestration.

use std::path::PathBuf;
use std::time::Instant;

use folio_widgets::{Branding, ContactWidget, WidgetRegistry};

use crate::bundle;
use crate::graph::{GraphError, TaskGraph};
use crate::minify;
use crate::vulcanize;

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Script entry module
    pub entry: PathBuf,

    /// Page markup to vulcanize
    pub page: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// File name of the bundled script
    pub bundle_name: String,

    /// Branding identifier injected into page widgets
    pub branding: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("components/resume.js"),
            page: PathBuf::from("index.html"),
            output_dir: PathBuf::from("dist"),
            bundle_name: "scripts.js".to_string(),
            branding: None,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct BuildResult {
    /// Tasks that completed, in execution order
    pub executed: Vec<String>,

    /// Total run time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Builds the site by running named tasks over a dependency graph.
#[derive(Debug)]
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a builder for the given configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Widgets applied while the page is processed.
    pub fn widgets(config: &BuildConfig) -> WidgetRegistry {
        let mut registry = WidgetRegistry::new();
        registry.register(ContactWidget::new(Branding::new(config.branding.clone())));
        registry
    }

    /// The task graph: `webpack`, `minify`, `vulcanize`, and the `default`
    /// aggregate. `vulcanize` inlines the unminified bundle; `minify` feeds
    /// nothing downstream.
    pub fn graph(&self) -> TaskGraph {
        let mut graph = TaskGraph::new();

        let cfg = self.config.clone();
        graph.register("webpack", &[], move || {
            bundle::write_bundle(&cfg.entry, &cfg.output_dir, &cfg.bundle_name)?;
            Ok(())
        });

        let cfg = self.config.clone();
        graph.register("minify", &[], move || {
            minify::compress_assets(&cfg.output_dir, &cfg.bundle_name)?;
            Ok(())
        });

        let cfg = self.config.clone();
        graph.register("vulcanize", &["webpack"], move || {
            let widgets = Self::widgets(&cfg);
            vulcanize::inline_page(&cfg.page, &cfg.output_dir, &widgets)?;
            Ok(())
        });

        graph.register("default", &["vulcanize", "minify"], || Ok(()));

        graph
    }

    /// Run one named task and everything it depends on.
    pub fn run_task(&self, name: &str) -> Result<BuildResult, GraphError> {
        let start = Instant::now();

        let executed = self.graph().run(name)?;

        Ok(BuildResult {
            executed,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Run the full pipeline.
    pub fn build(&self) -> Result<BuildResult, GraphError> {
        self.run_task("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn scaffold(root: &Path) -> BuildConfig {
        fs::create_dir_all(root.join("components")).unwrap();
        fs::create_dir_all(root.join("styles")).unwrap();

        fs::write(
            root.join("components/branding.js"),
            "export const branding = 'screamingbox';\n",
        )
        .unwrap();
        fs::write(
            root.join("components/resume.js"),
            "import { branding } from './branding.js';\n\nconsole.log(branding);\n",
        )
        .unwrap();
        fs::write(root.join("styles/main.css"), ".cover { color: red; }\n").unwrap();
        fs::write(
            root.join("index.html"),
            "<!DOCTYPE html><html><head>\
             <link rel=\"stylesheet\" href=\"styles/main.css\">\
             </head><body>\
             <cv-contact><div class=\"contact-info\">\
             <a class=\"email\" href=\"mailto:x@y\">x@y</a>\
             <a class=\"site\" href=\"http://old\">old</a>\
             </div></cv-contact>\
             <script src=\"dist/scripts.js\"></script>\
             </body></html>",
        )
        .unwrap();

        BuildConfig {
            entry: root.join("components/resume.js"),
            page: root.join("index.html"),
            output_dir: root.join("dist"),
            bundle_name: "scripts.js".to_string(),
            branding: Some("screamingbox".to_string()),
        }
    }

    #[test]
    fn full_build_produces_self_contained_page() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());
        let output_dir = config.output_dir.clone();

        let result = SiteBuilder::new(config).build().unwrap();

        assert_eq!(result.executed.len(), 4);
        assert_eq!(result.executed.last().map(String::as_str), Some("default"));

        let html = fs::read_to_string(output_dir.join("index.html")).unwrap();
        assert!(html.contains("<style>"));
        assert!(html.contains("console.log(branding)"));
        assert!(html.contains("branding-screamingbox"));
        assert!(html.contains("mailto:andras.sevcsik@screamingbox.com"));
        assert!(html.contains("http://screamingbox.com"));

        assert!(output_dir.join("scripts.js").exists());
        assert!(output_dir.join("scripts.js.map").exists());
        assert!(output_dir.join("scripts.min.js").exists());
    }

    #[test]
    fn vulcanize_pulls_in_webpack_first() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());
        let output_dir = config.output_dir.clone();

        let result = SiteBuilder::new(config).run_task("vulcanize").unwrap();

        assert_eq!(result.executed, vec!["webpack", "vulcanize"]);
        assert!(output_dir.join("scripts.js").exists());
        assert!(output_dir.join("index.html").exists());
        assert!(!output_dir.join("scripts.min.js").exists());
    }

    #[test]
    fn minify_runs_standalone_on_a_fresh_tree() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());

        let result = SiteBuilder::new(config).run_task("minify").unwrap();

        assert_eq!(result.executed, vec!["minify"]);
    }

    #[test]
    fn vulcanized_page_inlines_the_unminified_bundle() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());
        let output_dir = config.output_dir.clone();

        SiteBuilder::new(config).build().unwrap();

        let html = fs::read_to_string(output_dir.join("index.html")).unwrap();
        // The inlined script keeps the bundle's module banners and layout
        assert!(html.contains("// branding.js"));
        assert!(html.contains("// resume.js"));
    }

    #[test]
    fn missing_entry_fails_the_webpack_task() {
        let temp = tempdir().unwrap();
        let mut config = scaffold(temp.path());
        config.entry = temp.path().join("components/missing.js");

        let err = SiteBuilder::new(config).build().unwrap_err();

        assert!(matches!(
            err,
            GraphError::TaskFailed { ref task, .. } if task == "webpack"
        ));
    }

    #[test]
    fn unbranded_build_leaves_contact_fields_alone() {
        let temp = tempdir().unwrap();
        let mut config = scaffold(temp.path());
        config.branding = None;
        let output_dir = config.output_dir.clone();

        SiteBuilder::new(config).build().unwrap();

        let html = fs::read_to_string(output_dir.join("index.html")).unwrap();
        assert!(!html.contains("branding-"));
        assert!(html.contains("mailto:x@y"));
        assert!(html.contains("http://old"));
    }
}
