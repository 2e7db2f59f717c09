//! Script bundling: flatten relative ES-module imports into one file.
//!
//! Follows `import` statements with relative specifiers from the entry
//! module, emits each module once with dependencies ahead of dependents,
//! strips module syntax, and produces a v3 source map with line-level
//! mappings.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Errors that can occur while bundling.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Failed to read module {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Cannot resolve '{specifier}' from {importer}: only relative specifiers are supported")]
    UnsupportedSpecifier { specifier: String, importer: String },

    #[error("Imported module not found: '{specifier}' from {importer}")]
    MissingModule { specifier: String, importer: String },

    #[error("Failed to write bundle: {0}")]
    WriteError(String),
}

/// A flattened bundle with its source map.
#[derive(Debug)]
pub struct Bundle {
    /// Bundled script code
    pub code: String,

    /// Source map JSON
    pub source_map: String,

    /// Modules included, in emission order
    pub modules: Vec<PathBuf>,
}

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+(?:[^'"]+\s+from\s+)?["']([^"']+)["']\s*;?\s*$"#)
        .expect("Invalid import regex")
});

static EXPORT_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*export\s*\{[^}]*\}\s*(?:from\s*["'][^"']+["'])?\s*;?\s*$"#)
        .expect("Invalid export list regex")
});

static EXPORT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)export\s+(?:default\s+)?").expect("Invalid export regex"));

/// Bundle the module graph rooted at `entry`.
pub fn bundle(entry: &Path, file_name: &str) -> Result<Bundle, BundleError> {
    let root = entry
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let root = fs::canonicalize(&root).unwrap_or(root);

    let mut flattener = Flattener {
        root,
        visited: HashSet::new(),
        sources: Vec::new(),
        lines: Vec::new(),
        modules: Vec::new(),
    };

    flattener.flatten(entry)?;

    let mut code = String::new();
    for (line, _) in &flattener.lines {
        code.push_str(line);
        code.push('\n');
    }

    let source_map = build_source_map(file_name, &flattener.sources, &flattener.lines);

    Ok(Bundle {
        code,
        source_map,
        modules: flattener.modules,
    })
}

/// Bundle `entry` and write `<file_name>` plus its `.map` into `output_dir`.
pub fn write_bundle(entry: &Path, output_dir: &Path, file_name: &str) -> Result<Bundle, BundleError> {
    let bundle = bundle(entry, file_name)?;

    fs::create_dir_all(output_dir).map_err(|e| BundleError::WriteError(e.to_string()))?;

    let map_name = format!("{}.map", file_name);
    let code = format!("{}//# sourceMappingURL={}\n", bundle.code, map_name);

    fs::write(output_dir.join(file_name), code)
        .map_err(|e| BundleError::WriteError(e.to_string()))?;
    fs::write(output_dir.join(&map_name), &bundle.source_map)
        .map_err(|e| BundleError::WriteError(e.to_string()))?;

    tracing::info!(
        "Bundled {} modules into {}",
        bundle.modules.len(),
        output_dir.join(file_name).display()
    );

    Ok(bundle)
}

struct Flattener {
    root: PathBuf,
    visited: HashSet<PathBuf>,
    /// (display name, content) per module, in emission order
    sources: Vec<(String, String)>,
    /// (emitted line, (source index, 0-based source line))
    lines: Vec<(String, Option<(usize, usize)>)>,
    modules: Vec<PathBuf>,
}

impl Flattener {
    fn flatten(&mut self, path: &Path) -> Result<(), BundleError> {
        let canonical = fs::canonicalize(path).map_err(|e| BundleError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        if !self.visited.insert(canonical.clone()) {
            return Ok(());
        }

        let content = fs::read_to_string(&canonical).map_err(|e| BundleError::ReadError {
            path: canonical.display().to_string(),
            message: e.to_string(),
        })?;

        // Dependencies first
        for line in content.lines() {
            if let Some(caps) = IMPORT_RE.captures(line) {
                let specifier = &caps[1];
                let resolved = self.resolve(specifier, &canonical)?;
                self.flatten(&resolved)?;
            }
        }

        let name = self.display_name(&canonical);
        let source_index = self.sources.len();
        self.sources.push((name.clone(), content.clone()));
        self.modules.push(canonical);

        self.lines.push((format!("// {}", name), None));
        for (n, line) in content.lines().enumerate() {
            if IMPORT_RE.is_match(line) || EXPORT_LIST_RE.is_match(line) {
                continue;
            }
            let code = EXPORT_PREFIX_RE.replace(line, "$1");
            self.lines.push((code.into_owned(), Some((source_index, n))));
        }

        Ok(())
    }

    fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BundleError> {
        if !specifier.starts_with("./") && !specifier.starts_with("../") {
            return Err(BundleError::UnsupportedSpecifier {
                specifier: specifier.to_string(),
                importer: self.display_name(importer),
            });
        }

        let base = importer.parent().unwrap_or_else(|| Path::new("."));
        let candidate = base.join(specifier);

        if candidate.is_file() {
            return Ok(candidate);
        }
        if candidate.extension().is_none() {
            let with_js = candidate.with_extension("js");
            if with_js.is_file() {
                return Ok(with_js);
            }
        }

        Err(BundleError::MissingModule {
            specifier: specifier.to_string(),
            importer: self.display_name(importer),
        })
    }

    fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }
}

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64 VLQ encoding used by v3 source maps.
fn encode_vlq(value: i64, out: &mut String) {
    let mut v = if value < 0 {
        (((-value) as u64) << 1) | 1
    } else {
        (value as u64) << 1
    };

    loop {
        let mut digit = (v & 0x1f) as u8;
        v >>= 5;
        if v > 0 {
            digit |= 0x20;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if v == 0 {
            break;
        }
    }
}

fn build_source_map(
    file: &str,
    sources: &[(String, String)],
    lines: &[(String, Option<(usize, usize)>)],
) -> String {
    let mut mappings = String::new();
    let mut prev_source: i64 = 0;
    let mut prev_line: i64 = 0;

    for (i, (_, mapping)) in lines.iter().enumerate() {
        if i > 0 {
            mappings.push(';');
        }
        if let Some((source, line)) = mapping {
            encode_vlq(0, &mut mappings);
            encode_vlq(*source as i64 - prev_source, &mut mappings);
            encode_vlq(*line as i64 - prev_line, &mut mappings);
            encode_vlq(0, &mut mappings);
            prev_source = *source as i64;
            prev_line = *line as i64;
        }
    }

    serde_json::json!({
        "version": 3,
        "file": file,
        "sources": sources.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        "sourcesContent": sources.iter().map(|(_, content)| content).collect::<Vec<_>>(),
        "names": [],
        "mappings": mappings,
    })
    .to_string()
}
