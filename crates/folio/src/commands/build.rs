//! Full pipeline build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_pipeline::SiteBuilder;

use crate::config;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, no_minify: bool) -> Result<()> {
    tracing::info!("Building site...");

    let file = config::load(config_path)?;
    let mut build_config = file.to_build_config();
    if let Some(output) = output {
        build_config.output_dir = output;
    }

    let builder = SiteBuilder::new(build_config);
    let result = if no_minify {
        builder.run_task("vulcanize")?
    } else {
        builder.build()?
    };

    tracing::info!(
        "Ran {} task(s) in {}ms",
        result.executed.len(),
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
