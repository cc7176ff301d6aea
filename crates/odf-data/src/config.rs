//! Resolved pipeline configuration.
//!
//! [`PipelineConfig`] is what the pipeline runs on: absolute directories and
//! ready-built stage objects. It is produced from a [`PipelineData`] file by
//! [`load_config`] or assembled directly with [`PipelineConfig::new`].

use odf_core::{Categorizer, ReferenceLinker};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::loader::{CollectOptions, DataLoadError, deserialize_file, find_data_file};
use crate::schema::PipelineData;

/// Base name of the config file looked up by [`find_config`].
pub const CONFIG_BASE_NAME: &str = "odf";

/// Everything [`crate::pipeline::run_pipeline`] needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub collect: CollectOptions,
    pub linker: ReferenceLinker,
    pub categorizer: Categorizer,
}

impl PipelineConfig {
    /// Default stages over the given directories.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            collect: CollectOptions::default(),
            linker: ReferenceLinker::default(),
            categorizer: Categorizer::default(),
        }
    }

    /// Build from file data. Relative directories are joined onto `base`.
    pub fn from_data(data: PipelineData, base: &Path) -> Self {
        let categorizer = if data.categories.is_empty() {
            Categorizer::default()
        } else {
            Categorizer::new(data.categories)
        };
        Self {
            source_dir: base.join(data.source_dir),
            output_dir: base.join(data.output_dir),
            collect: data.collect,
            linker: ReferenceLinker::new(data.link.schema).guarded(data.link.guarded),
            categorizer,
        }
    }
}

/// Load a pipeline config file. The format is detected from the extension.
pub fn load_config(path: &Path) -> Result<PipelineConfig, DataLoadError> {
    let data: PipelineData = deserialize_file(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let config = PipelineConfig::from_data(data, base);
    debug!(
        config = %path.display(),
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        "loaded pipeline config"
    );
    Ok(config)
}

/// Look for `odf.{ron,toml,json}` in `dir` and load it if present.
pub fn find_config(dir: &Path) -> Result<Option<PipelineConfig>, DataLoadError> {
    find_data_file(dir, CONFIG_BASE_NAME)?
        .map(|path| load_config(&path))
        .transpose()
}
