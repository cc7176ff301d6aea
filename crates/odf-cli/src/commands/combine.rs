//! Combine command

use anyhow::Context;
use odf_data::{CollectOptions, CollisionPolicy};
use std::path::Path;

pub fn run(source: &Path, output: &Path, strict: bool, coerce_numbers: bool) -> anyhow::Result<()> {
    let options = CollectOptions {
        collision: if strict {
            CollisionPolicy::Error
        } else {
            CollisionPolicy::LastWins
        },
        coerce_numbers,
        ..CollectOptions::default()
    };

    let store = odf_data::pipeline::combine(source, output, &options)
        .with_context(|| format!("combining records from {}", source.display()))?;

    println!("Combined {} objects into {}", store.len(), output.display());
    Ok(())
}
