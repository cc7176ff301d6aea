//! End-to-end pipeline: collect, resolve and link, categorize.
//!
//! Each stage is available on its own (the CLI exposes them as separate
//! subcommands) and [`run_pipeline`] chains all three in memory, writing
//! every intermediate result to the output directory.

use odf_core::{Categories, Categorizer, LinkReport, ReferenceLinker, Store, resolve_and_link};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::PipelineConfig;
use crate::loader::{CollectOptions, DataLoadError, collect_records, read_store};
use crate::writer::write_json;

/// Output of the collection stage.
pub const COMBINED_FILE: &str = "combined.json";
/// Output of the resolve and link stage.
pub const RESOLVED_FILE: &str = "resolved.json";
/// Output of the categorization stage.
pub const CATEGORIZED_FILE: &str = "categorized.json";

/// What a full pipeline run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    pub objects: usize,
    /// Object count per category, in rule order.
    pub categories: Vec<(String, usize)>,
    pub uncategorized: usize,
    pub links: LinkReport,
    pub outputs: Vec<PathBuf>,
}

// ===========================================================================
// Stages
// ===========================================================================

/// Collect `source_dir` and write the combined store to `output`.
pub fn combine(
    source_dir: &Path,
    output: &Path,
    options: &CollectOptions,
) -> Result<Store, DataLoadError> {
    let store = collect_records(source_dir, options)?;
    write_json(output, &store)?;
    info!(objects = store.len(), file = %output.display(), "combine stage done");
    Ok(store)
}

/// Resolve and link the store in `input` and write the result to `output`.
pub fn resolve(
    input: &Path,
    output: &Path,
    linker: &ReferenceLinker,
) -> Result<(Store, LinkReport), DataLoadError> {
    let store = read_store(input)?;
    resolve_store(&store, output, linker)
}

/// Categorize the store in `input` and write the buckets to `output`.
pub fn categorize(
    input: &Path,
    output: &Path,
    categorizer: &Categorizer,
) -> Result<Categories, DataLoadError> {
    let store = read_store(input)?;
    categorize_store(&store, output, categorizer)
}

fn resolve_store(
    store: &Store,
    output: &Path,
    linker: &ReferenceLinker,
) -> Result<(Store, LinkReport), DataLoadError> {
    let (resolved, report) = resolve_and_link(store, linker)?;
    write_json(output, &resolved)?;
    info!(
        objects = resolved.len(),
        ordnance_links = report.ordnance_links,
        powerup_links = report.powerup_links,
        warnings = report.warnings.len(),
        file = %output.display(),
        "resolve stage done"
    );
    Ok((resolved, report))
}

fn categorize_store(
    store: &Store,
    output: &Path,
    categorizer: &Categorizer,
) -> Result<Categories, DataLoadError> {
    let categories = categorizer.categorize(store);
    write_json(output, &categories.buckets)?;
    info!(
        categories = categories.buckets.len(),
        uncategorized = categories.uncategorized,
        file = %output.display(),
        "categorize stage done"
    );
    Ok(categories)
}

// ===========================================================================
// Full run
// ===========================================================================

/// Run every stage over `config`, writing [`COMBINED_FILE`],
/// [`RESOLVED_FILE`] and [`CATEGORIZED_FILE`] into the output directory.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary, DataLoadError> {
    let combined_path = config.output_dir.join(COMBINED_FILE);
    let resolved_path = config.output_dir.join(RESOLVED_FILE);
    let categorized_path = config.output_dir.join(CATEGORIZED_FILE);

    let combined = combine(&config.source_dir, &combined_path, &config.collect)?;
    let (resolved, links) = resolve_store(&combined, &resolved_path, &config.linker)?;
    let categories = categorize_store(&resolved, &categorized_path, &config.categorizer)?;

    Ok(PipelineSummary {
        objects: resolved.len(),
        categories: categories
            .buckets
            .iter()
            .map(|(name, bucket)| (name.clone(), bucket.len()))
            .collect(),
        uncategorized: categories.uncategorized,
        links,
        outputs: vec![combined_path, resolved_path, categorized_path],
    })
}
