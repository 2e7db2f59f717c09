//! Inline script and style references to produce a self-contained page.
//!
//! Page widgets are applied first, then every local `<script src>` and
//! `<link rel="stylesheet">` reference is replaced by the asset's content.
//! Remote references are left untouched. A missing local asset aborts the
//! task: the page cannot be made self-contained without it.

use std::fs;
use std::path::{Path, PathBuf};

use folio_markup::{parse, Element, Node};
use folio_widgets::WidgetRegistry;

/// Errors that can occur while inlining a page.
#[derive(Debug, thiserror::Error)]
pub enum VulcanizeError {
    #[error("Failed to read page {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to parse page {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Referenced asset not found: '{reference}'")]
    MissingAsset { reference: String },

    #[error("Failed to write page: {0}")]
    WriteError(String),
}

/// What an inlining pass did.
#[derive(Debug, Default)]
pub struct VulcanizeReport {
    pub widgets_mounted: usize,
    pub scripts_inlined: usize,
    pub styles_inlined: usize,

    /// Path of the written page
    pub output: PathBuf,
}

/// Apply widgets to `page` and inline its asset references, writing the
/// self-contained result into `output_dir` under the page's file name.
pub fn inline_page(
    page: &Path,
    output_dir: &Path,
    widgets: &WidgetRegistry,
) -> Result<VulcanizeReport, VulcanizeError> {
    let source = fs::read_to_string(page).map_err(|e| VulcanizeError::ReadError {
        path: page.display().to_string(),
        message: e.to_string(),
    })?;

    let mut doc = parse(&source).map_err(|e| VulcanizeError::ParseError {
        path: page.display().to_string(),
        message: e.to_string(),
    })?;

    let mut report = VulcanizeReport {
        widgets_mounted: widgets.apply(&mut doc),
        ..Default::default()
    };

    let base = page.parent().unwrap_or_else(|| Path::new("."));
    inline_nodes(&mut doc.nodes, base, output_dir, &mut report)?;

    fs::create_dir_all(output_dir).map_err(|e| VulcanizeError::WriteError(e.to_string()))?;

    let file_name = page
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("index.html"));
    let output = output_dir.join(file_name);

    fs::write(&output, doc.to_html()).map_err(|e| VulcanizeError::WriteError(e.to_string()))?;

    tracing::info!(
        "Vulcanized {} ({} widgets, {} scripts, {} styles inlined)",
        output.display(),
        report.widgets_mounted,
        report.scripts_inlined,
        report.styles_inlined
    );

    report.output = output;
    Ok(report)
}

fn inline_nodes(
    nodes: &mut [Node],
    base: &Path,
    output_dir: &Path,
    report: &mut VulcanizeReport,
) -> Result<(), VulcanizeError> {
    for node in nodes.iter_mut() {
        // A stylesheet link becomes a style element
        let style = match node {
            Node::Element(el) if is_stylesheet_link(el) => {
                let href = el.attr("href").unwrap_or_default().to_string();
                if is_remote(&href) {
                    None
                } else {
                    let content = load_asset(&href, base, output_dir)?;
                    let mut style = Element::new("style");
                    style.set_text(content);
                    Some(style)
                }
            }
            _ => None,
        };

        if let Some(style) = style {
            *node = Node::Element(style);
            report.styles_inlined += 1;
            continue;
        }

        let Node::Element(el) = node else {
            continue;
        };

        if el.tag == "script" {
            if let Some(src) = el.attr("src").map(str::to_string) {
                if !is_remote(&src) {
                    let content = load_asset(&src, base, output_dir)?;
                    el.remove_attr("src");
                    el.set_text(content);
                    report.scripts_inlined += 1;
                    continue;
                }
            }
        }

        inline_nodes(&mut el.children, base, output_dir, report)?;
    }

    Ok(())
}

fn is_stylesheet_link(el: &Element) -> bool {
    el.tag == "link"
        && el
            .attr("rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
        && el.attr("href").is_some()
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("//")
        || reference.starts_with("data:")
}

/// Resolve an asset reference against the page directory, falling back to
/// the output directory for built artifacts.
fn load_asset(reference: &str, base: &Path, output_dir: &Path) -> Result<String, VulcanizeError> {
    let relative = reference.trim_start_matches("./");

    for candidate in [base.join(relative), output_dir.join(relative)] {
        if candidate.is_file() {
            return fs::read_to_string(&candidate).map_err(|e| VulcanizeError::ReadError {
                path: candidate.display().to_string(),
                message: e.to_string(),
            });
        }
    }

    Err(VulcanizeError::MissingAsset {
        reference: reference.to_string(),
    })
}
