//! Resolve command

use anyhow::Context;
use odf_core::ReferenceLinker;
use std::path::Path;

pub fn run(input: &Path, output: &Path, guarded: bool) -> anyhow::Result<()> {
    let linker = ReferenceLinker::default().guarded(guarded);
    let (store, report) = odf_data::pipeline::resolve(input, output, &linker)
        .with_context(|| format!("resolving {}", input.display()))?;

    println!("Resolved {} objects into {}", store.len(), output.display());
    println!(
        "  {} ordnance links, {} powerup links, {} names backfilled",
        report.ordnance_links, report.powerup_links, report.backfilled_names
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}
