//! ODF Core -- inheritance and reference resolution for game object definitions.
//!
//! This crate takes a flat batch of ODF descriptors (objects made of named
//! sections of properties) and produces a fully resolved configuration for
//! each one.
//!
//! # Resolution Pipeline
//!
//! 1. **Inheritance** -- [`resolver::InheritanceResolver`] follows each
//!    descriptor's `classLabel` to its parent, deep-merges ancestors into
//!    descendants, and records the inheritance chain.
//! 2. **Linking** -- [`linker::ReferenceLinker`] attaches ordnance sections to
//!    weapons and powerup sections to the weapons they grant.
//! 3. **Categorization** -- [`categorize::Categorizer`] partitions the result
//!    into named buckets using an ordered rule list.
//!
//! ```rust,ignore
//! let resolved = InheritanceResolver::new(&store).resolve_all()?;
//! let mut linked = resolved;
//! let report = ReferenceLinker::default().link(&mut linked);
//! let buckets = Categorizer::default().categorize(&linked);
//! ```
//!
//! # Key Types
//!
//! - [`value::PropertyValue`] -- Tagged union of integer, float, string and
//!   nested mapping.
//! - [`store::Descriptor`] -- One ODF object: ordered sections plus its
//!   resolved inheritance chain.
//! - [`store::Store`] -- Ordered identifier -> descriptor mapping.
//! - [`store::IdentifierIndex`] -- Case-insensitive identifier lookup.

pub mod categorize;
pub mod error;
pub mod linker;
pub mod merge;
pub mod resolver;
pub mod store;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{Categories, CategoryRule, Categorizer};
pub use error::ResolveError;
pub use linker::{LinkReport, LinkSchema, LinkWarning, ReferenceLinker};
pub use merge::{merge, merge_sections};
pub use resolver::InheritanceResolver;
pub use store::{Descriptor, IdentifierIndex, Sections, Store, normalize_identifier};
pub use value::{PropertyMap, PropertyValue};

/// Resolve inheritance for every descriptor in `store`, then run the
/// reference linker over the result.
pub fn resolve_and_link(
    store: &Store,
    linker: &ReferenceLinker,
) -> Result<(Store, LinkReport), ResolveError> {
    let mut resolved = InheritanceResolver::new(store).resolve_all()?;
    let report = linker.link(&mut resolved);
    Ok((resolved, report))
}
