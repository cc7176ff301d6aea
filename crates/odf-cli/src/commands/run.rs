//! Run command

use anyhow::Context;
use odf_data::{PipelineConfig, find_config, load_config, run_pipeline};
use std::path::Path;
use tracing::info;

pub fn run(config: Option<&Path>) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => match find_config(Path::new("."))? {
            Some(config) => config,
            None => {
                info!("no odf config found, using ./odf and ./out");
                PipelineConfig::new("odf", "out")
            }
        },
    };

    let summary = run_pipeline(&config).context("running pipeline")?;

    println!("Resolved {} objects", summary.objects);
    for (category, count) in &summary.categories {
        println!("  {category}: {count}");
    }
    if summary.uncategorized > 0 {
        println!("  ({} uncategorized)", summary.uncategorized);
    }
    println!(
        "  {} ordnance links, {} powerup links, {} warnings",
        summary.links.ordnance_links,
        summary.links.powerup_links,
        summary.links.warnings.len()
    );
    for path in &summary.outputs {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
