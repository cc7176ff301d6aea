//! Serde structs for the on-disk pipeline configuration.
//!
//! A pipeline config (`odf.toml`, `odf.ron` or `odf.json`) names the source
//! and output directories and tunes each stage. Every field is optional.
//! The structs are turned into a [`crate::config::PipelineConfig`] by
//! [`crate::config::load_config`].

use odf_core::{CategoryRule, LinkSchema};
use serde::Deserialize;
use std::path::PathBuf;

use crate::loader::CollectOptions;

// ===========================================================================
// Pipeline
// ===========================================================================

/// Top-level pipeline configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineData {
    /// Directory of per-file ODF records. Relative to the config file.
    pub source_dir: PathBuf,
    /// Directory the stage outputs are written to. Relative to the config file.
    pub output_dir: PathBuf,
    pub collect: CollectOptions,
    pub link: LinkData,
    /// Categorization rules. Empty means the built-in rule set.
    pub categories: Vec<CategoryRule>,
}

impl Default for PipelineData {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("odf"),
            output_dir: PathBuf::from("out"),
            collect: CollectOptions::default(),
            link: LinkData::default(),
            categories: Vec::new(),
        }
    }
}

// ===========================================================================
// Linking
// ===========================================================================

/// Linking stage settings. Schema fields sit next to `guarded`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkData {
    pub guarded: bool,
    #[serde(flatten)]
    pub schema: LinkSchema,
}
