//! Configuration file loading (site.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_pipeline::BuildConfig;
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub paths: PathsSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct SiteSettings {
    /// Branding identifier applied to page widgets
    #[serde(default)]
    pub branding: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PathsSettings {
    #[serde(default = "default_entry")]
    pub entry: String,
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_bundle")]
    pub bundle: String,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            page: default_page(),
            output: default_output(),
            bundle: default_bundle(),
        }
    }
}

fn default_entry() -> String {
    "components/resume.js".to_string()
}
fn default_page() -> String {
    "index.html".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_bundle() -> String {
    "scripts.js".to_string()
}

impl ConfigFile {
    /// Map the file settings onto a pipeline configuration.
    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            entry: PathBuf::from(&self.paths.entry),
            page: PathBuf::from(&self.paths.page),
            output_dir: PathBuf::from(&self.paths.output),
            bundle_name: self.paths.bundle.clone(),
            branding: self.site.branding.clone(),
        }
    }
}

/// Load configuration from the given path if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();

        let config = load(&temp.path().join("site.toml")).unwrap();

        assert_eq!(config.paths.entry, "components/resume.js");
        assert_eq!(config.paths.output, "dist");
        assert!(config.site.branding.is_none());
    }

    #[test]
    fn parses_full_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(
            &path,
            r#"
[site]
branding = "screamingbox"

[paths]
entry = "src/app.js"
page = "cv.html"
output = "public"
bundle = "app.js"
"#,
        )
        .unwrap();

        let config = load(&path).unwrap();

        assert_eq!(config.site.branding.as_deref(), Some("screamingbox"));
        assert_eq!(config.paths.entry, "src/app.js");
        assert_eq!(config.paths.page, "cv.html");
        assert_eq!(config.paths.output, "public");
        assert_eq!(config.paths.bundle, "app.js");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[paths]\noutput = \"public\"\n").unwrap();

        let config = load(&path).unwrap();

        assert_eq!(config.paths.output, "public");
        assert_eq!(config.paths.entry, "components/resume.js");
        assert_eq!(config.paths.bundle, "scripts.js");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[site\nbranding = ").unwrap();

        assert!(load(&path).is_err());
    }

    #[test]
    fn maps_onto_build_config() {
        let config = ConfigFile::default().to_build_config();

        assert_eq!(config.entry, PathBuf::from("components/resume.js"));
        assert_eq!(config.page, PathBuf::from("index.html"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.bundle_name, "scripts.js");
        assert!(config.branding.is_none());
    }
}
