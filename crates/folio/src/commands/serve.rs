//! Preview server command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_server::{PreviewServer, ServeConfig};

use crate::config;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let file = config::load(config_path)?;
    let dir = dir.unwrap_or_else(|| PathBuf::from(&file.paths.output));

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'folio build' first.",
            dir.display()
        );
    }

    PreviewServer::new(ServeConfig {
        dir,
        port,
        ..Default::default()
    })
    .start()
    .await?;

    Ok(())
}
