//! Run a single named pipeline task.

use std::path::Path;

use anyhow::Result;
use folio_pipeline::SiteBuilder;

use crate::config;

/// Run the given task and its prerequisites.
pub async fn run(config_path: &Path, task: &str) -> Result<()> {
    let file = config::load(config_path)?;
    let builder = SiteBuilder::new(file.to_build_config());

    let names = builder.graph().task_names().join(", ");
    if !builder.graph().task_names().contains(&task) {
        anyhow::bail!("Unknown task '{}'. Available tasks: {}", task, names);
    }

    let result = builder.run_task(task)?;

    tracing::info!(
        "Ran {} task(s) in {}ms: {}",
        result.executed.len(),
        result.duration_ms,
        result.executed.join(", ")
    );

    Ok(())
}
