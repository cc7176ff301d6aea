//! Categorize command

use anyhow::Context;
use odf_core::Categorizer;
use std::path::Path;

pub fn run(input: &Path, output: &Path) -> anyhow::Result<()> {
    let categories = odf_data::pipeline::categorize(input, output, &Categorizer::default())
        .with_context(|| format!("categorizing {}", input.display()))?;

    println!("Categorized into {}", output.display());
    for (category, bucket) in &categories.buckets {
        println!("  {category}: {}", bucket.len());
    }
    if categories.uncategorized > 0 {
        println!("  ({} uncategorized)", categories.uncategorized);
    }
    Ok(())
}
