//! Watch-and-rebuild development command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_pipeline::SiteBuilder;
use folio_server::{FileWatcher, PreviewServer, ServeConfig, WatchEvent};

use crate::config;

/// Run the dev command: rebuild on source changes and serve the output.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    let file = config::load(config_path)?;
    let build_config = file.to_build_config();
    let output_dir = build_config.output_dir.clone();

    match SiteBuilder::new(build_config.clone()).build() {
        Ok(result) => tracing::info!("Initial build finished in {}ms", result.duration_ms),
        Err(e) => tracing::warn!("Initial build failed: {}", e),
    }

    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    // Watch the page, the script modules, and the stylesheets; the output
    // directory stays unwatched so rebuilds don't retrigger themselves
    let watch_paths = vec![
        build_config.page.clone(),
        build_config
            .entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        PathBuf::from("styles"),
    ];

    let (watcher, mut rx) = FileWatcher::new(&watch_paths)?;

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                WatchEvent::PageModified(path) => {
                    tracing::info!("Page modified: {}", path.display());
                }
                WatchEvent::ComponentModified(path) => {
                    tracing::info!("Component modified: {}", path.display());
                }
                WatchEvent::StyleModified(path) => {
                    tracing::info!("Stylesheet modified: {}", path.display());
                }
                WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => {
                    tracing::info!("Changed: {}", path.display());
                }
            }

            let builder = SiteBuilder::new(build_config.clone());
            match tokio::task::spawn_blocking(move || builder.build()).await {
                Ok(Ok(result)) => tracing::info!("Rebuilt in {}ms", result.duration_ms),
                Ok(Err(e)) => tracing::warn!("Rebuild failed: {}", e),
                Err(e) => tracing::warn!("Rebuild task panicked: {}", e),
            }
        }

        // Keep watcher alive for the lifetime of the event loop
        drop(watcher);
    });

    PreviewServer::new(ServeConfig {
        dir: output_dir,
        port,
        open,
        ..Default::default()
    })
    .start()
    .await?;

    Ok(())
}
