//! Asset compression for built output.
//!
//! Scripts go through a conservative string- and comment-aware whitespace
//! compressor; stylesheets are minified with lightningcss.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors that can occur while compressing assets.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Failed to minify stylesheet {path}: {message}")]
    CssError { path: String, message: String },
}

/// What a compression pass produced.
#[derive(Debug, Default)]
pub struct MinifySummary {
    /// Compressed script, if the bundle was present
    pub script: Option<PathBuf>,

    /// Number of stylesheets minified
    pub stylesheets: usize,
}

/// Compress built assets under `output_dir`.
///
/// The bundle (`bundle_name`, if present) is rewritten as `<stem>.min.js`
/// and every non-minified `.css` file gains a `.min.css` sibling. A missing
/// output directory or bundle is a no-op, not an error: there is simply
/// nothing to compress yet.
pub fn compress_assets(output_dir: &Path, bundle_name: &str) -> Result<MinifySummary, MinifyError> {
    let mut summary = MinifySummary::default();

    if !output_dir.exists() {
        tracing::debug!("Nothing to compress: {} does not exist", output_dir.display());
        return Ok(summary);
    }

    let script = output_dir.join(bundle_name);
    if script.is_file() {
        let source = fs::read_to_string(&script).map_err(|e| MinifyError::ReadError {
            path: script.display().to_string(),
            message: e.to_string(),
        })?;

        let stem = script
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scripts");
        let target = output_dir.join(format!("{}.min.js", stem));

        fs::write(&target, minify_js(&source)).map_err(|e| MinifyError::WriteError {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Compressed {} -> {}", script.display(), target.display());
        summary.script = Some(target);
    } else {
        tracing::debug!("No bundle at {}, skipping script compression", script.display());
    }

    let stylesheets: Vec<PathBuf> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && p.extension().and_then(|e| e.to_str()) == Some("css")
                && !p
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .ends_with(".min.css")
        })
        .collect();

    for path in stylesheets {
        let css = fs::read_to_string(&path).map_err(|e| MinifyError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let minified = minify_css(&css).map_err(|message| MinifyError::CssError {
            path: path.display().to_string(),
            message,
        })?;

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("style");
        let target = path.with_file_name(format!("{}.min.css", stem));

        fs::write(&target, minified).map_err(|e| MinifyError::WriteError {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;

        summary.stylesheets += 1;
    }

    Ok(summary)
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}

/// Whitespace and comment compression for scripts.
///
/// String, template, and regex literals are copied verbatim. Newlines
/// between statements are kept unless removal is unambiguous, so automatic
/// semicolon insertion is never disturbed.
pub fn minify_js(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut pending: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // '//' is always a comment: an empty regex is spelled /(?:)/
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            let mut had_newline = false;
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && i + 1 < chars.len() && chars[i + 1] == '/')
            {
                if chars[i] == '\n' {
                    had_newline = true;
                }
                i += 1;
            }
            i = (i + 2).min(chars.len());
            merge_pending(&mut pending, if had_newline { '\n' } else { ' ' });
            continue;
        }

        if c.is_whitespace() {
            merge_pending(&mut pending, if c == '\n' { '\n' } else { ' ' });
            i += 1;
            continue;
        }

        if let Some(ws) = pending.take() {
            if should_emit_whitespace(prev, c, ws) {
                out.push(ws);
            }
        }

        if c == '"' || c == '\'' || c == '`' {
            i = copy_delimited(&chars, i, c, &mut out);
            prev = Some(c);
            continue;
        }

        if c == '/' && regex_can_start(prev) {
            i = copy_regex(&chars, i, &mut out);
            prev = Some('/');
            continue;
        }

        out.push(c);
        prev = Some(c);
        i += 1;
    }

    out
}

/// Copy a quoted literal verbatim, honoring backslash escapes.
fn copy_delimited(chars: &[char], start: usize, quote: char, out: &mut String) -> usize {
    let mut i = start;
    out.push(chars[i]);
    i += 1;

    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;

        if c == '\\' && i < chars.len() {
            out.push(chars[i]);
            i += 1;
        } else if c == quote {
            break;
        }
    }

    i
}

/// Copy a regex literal verbatim. A newline means this was a division
/// expression after all; stop copying and let the caller continue.
fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    let mut i = start;
    out.push(chars[i]);
    i += 1;

    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;

        if c == '\\' && i < chars.len() {
            out.push(chars[i]);
            i += 1;
        } else if c == '[' {
            in_class = true;
        } else if c == ']' {
            in_class = false;
        } else if (c == '/' && !in_class) || c == '\n' {
            break;
        }
    }

    i
}

fn merge_pending(pending: &mut Option<char>, ws: char) {
    if ws == '\n' || pending.is_none() {
        *pending = Some(if ws == '\n' { '\n' } else { ' ' });
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn should_emit_whitespace(prev: Option<char>, next: char, ws: char) -> bool {
    let Some(prev) = prev else {
        return false;
    };

    if ws == '\n' {
        // Only drop a newline where no statement can end
        return !(matches!(prev, '{' | '(' | '[' | ';' | ',') || matches!(next, ')' | ']'));
    }

    (is_ident_char(prev) && is_ident_char(next)) || (prev == next && matches!(prev, '+' | '-'))
}

/// Whether a `/` at this position starts a regex literal rather than
/// division, judged by the previous significant character.
fn regex_can_start(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => matches!(
            c,
            '=' | '(' | ',' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '+' | '-'
                | '*' | '%' | '~' | '^' | '<' | '>' | '\n'
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn strips_comments_but_not_urls_in_strings() {
        let source = "var s = \"http://example.com\"; // trailing note\n";
        assert_eq!(minify_js(source), "var s=\"http://example.com\";");
    }

    #[test]
    fn collapses_spaces_around_punctuation() {
        assert_eq!(minify_js("a  =  1 ;"), "a=1;");
        assert_eq!(minify_js("var a = 1;"), "var a=1;");
    }

    #[test]
    fn preserves_unary_operator_pairs() {
        assert_eq!(minify_js("a + +b"), "a+ +b");
        assert_eq!(minify_js("a - -b"), "a- -b");
        assert_eq!(minify_js("a + b"), "a+b");
    }

    #[test]
    fn keeps_statement_newlines() {
        assert_eq!(minify_js("var a = 1\nvar b = 2\n"), "var a=1\nvar b=2");
    }

    #[test]
    fn drops_newlines_after_openers() {
        assert_eq!(minify_js("f(\n  a,\n  b\n);"), "f(a,b);");
    }

    #[test]
    fn strips_block_comments() {
        assert_eq!(minify_js("a /* gap */ = 1;"), "a=1;");
    }

    #[test]
    fn preserves_regex_literals() {
        assert_eq!(
            minify_js("var re = /https:\\/\\//; // match scheme\n"),
            "var re=/https:\\/\\//;"
        );
    }

    #[test]
    fn preserves_template_literals() {
        assert_eq!(
            minify_js("var t = `a  ${x}  b`;"),
            "var t=`a  ${x}  b`;"
        );
    }

    #[test]
    fn compresses_bundle_and_styles() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("scripts.js"), "var a = 1; // note\n").unwrap();
        fs::write(out.join("main.css"), ".cover {\n  color: red;\n}\n").unwrap();

        let summary = compress_assets(&out, "scripts.js").unwrap();

        assert_eq!(summary.stylesheets, 1);
        let js = fs::read_to_string(out.join("scripts.min.js")).unwrap();
        assert_eq!(js, "var a=1;");

        let css = fs::read_to_string(out.join("main.min.css")).unwrap();
        assert!(!css.contains('\n'));
        assert!(css.contains(".cover"));
    }

    #[test]
    fn missing_output_dir_is_a_no_op() {
        let temp = tempdir().unwrap();

        let summary = compress_assets(&temp.path().join("dist"), "scripts.js").unwrap();

        assert!(summary.script.is_none());
        assert_eq!(summary.stylesheets, 0);
    }

    #[test]
    fn missing_bundle_still_succeeds() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        fs::create_dir_all(&out).unwrap();

        let summary = compress_assets(&out, "scripts.js").unwrap();

        assert!(summary.script.is_none());
    }

    #[test]
    fn already_minified_styles_are_skipped() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("main.min.css"), ".a{color:red}").unwrap();

        let summary = compress_assets(&out, "scripts.js").unwrap();

        assert_eq!(summary.stylesheets, 0);
        assert!(!out.join("main.min.min.css").exists());
    }

    #[test]
    fn minify_css_drops_whitespace() {
        let minified = minify_css(".cover {\n  color: red;\n  padding: 10px;\n}\n").unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".cover"));
    }
}
