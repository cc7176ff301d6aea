//! File-based front end for `odf-core`: record collection, pipeline config,
//! and JSON output.

pub mod clean;
pub mod config;
pub mod loader;
pub mod pipeline;
pub mod schema;
pub mod writer;

pub use config::{PipelineConfig, find_config, load_config};
pub use loader::{CollectOptions, CollisionPolicy, DataLoadError, collect_records, read_store};
pub use pipeline::{PipelineSummary, run_pipeline};
pub use writer::write_json;
