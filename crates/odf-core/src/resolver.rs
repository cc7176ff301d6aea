//! Single-parent inheritance resolution.
//!
//! Each descriptor names its parent through a `classLabel` property. The
//! resolver follows that chain depth-first, resolves ancestors before
//! descendants, and deep-merges every ancestor into the descriptor. The
//! labels walked along the way become the descriptor's inheritance chain.
//!
//! A visited set scoped to one top-level [`InheritanceResolver::resolve`]
//! call breaks cycles: re-entering an identifier returns its raw descriptor,
//! leaving the merge partial for the object that closes the loop.

use std::collections::HashSet;
use tracing::{debug, info, trace};

use crate::error::ResolveError;
use crate::merge::merge_sections;
use crate::store::{CLASS_LABEL, Descriptor, IdentifierIndex, Store};
use crate::value::PropertyValue;

/// Resolves inheritance against an immutable input store.
///
/// Every top-level resolution reads only the input store, so results do
/// not depend on the order in which identifiers are resolved.
#[derive(Debug)]
pub struct InheritanceResolver<'a> {
    store: &'a Store,
    index: IdentifierIndex,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            index: IdentifierIndex::build(store),
        }
    }

    /// Resolve one descriptor by its exact stored identifier.
    pub fn resolve(&self, identifier: &str) -> Result<Descriptor, ResolveError> {
        let mut visited = HashSet::new();
        self.resolve_with(identifier, &mut visited)
    }

    /// Resolve every descriptor, keyed by its original identifier in input order.
    pub fn resolve_all(&self) -> Result<Store, ResolveError> {
        let ids: Vec<&str> = self.store.identifiers().collect();

        #[cfg(feature = "parallel")]
        let resolved: Vec<(String, Descriptor)> = {
            use rayon::prelude::*;
            ids.par_iter()
                .map(|id| Ok((id.to_string(), self.resolve(id)?)))
                .collect::<Result<_, ResolveError>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let resolved: Vec<(String, Descriptor)> = ids
            .iter()
            .map(|id| Ok((id.to_string(), self.resolve(id)?)))
            .collect::<Result<_, ResolveError>>()?;

        let labelled = resolved.iter().filter(|(_, d)| !d.chain().is_empty()).count();
        info!(
            descriptors = resolved.len(),
            labelled,
            "resolved inheritance"
        );
        Ok(resolved.into_iter().collect())
    }

    fn resolve_with(
        &self,
        identifier: &str,
        visited: &mut HashSet<String>,
    ) -> Result<Descriptor, ResolveError> {
        let mut descriptor =
            self.store
                .get(identifier)
                .cloned()
                .ok_or_else(|| ResolveError::UnknownIdentifier {
                    identifier: identifier.to_string(),
                })?;

        if !visited.insert(identifier.to_string()) {
            trace!(identifier, "inheritance cycle, stopping");
            return Ok(descriptor);
        }

        let chain = descriptor.inheritance_chain.take().unwrap_or_default();

        let Some(label) = find_class_label(identifier, &descriptor)? else {
            descriptor.inheritance_chain = Some(chain);
            return Ok(descriptor);
        };

        let Some(parent_id) = self.index.resolve_reference(&label) else {
            debug!(identifier, parent = %label, "parent not in store, chain ends");
            let mut chain = chain;
            if !chain.contains(&label) {
                chain.push(label);
            }
            descriptor.inheritance_chain = Some(chain);
            return Ok(descriptor);
        };

        let parent = self.resolve_with(parent_id, visited)?;
        let mut merged = Descriptor::from_sections(merge_sections(&descriptor.sections, &parent.sections));
        merged.inheritance_chain = Some(compose_chain(label, parent.chain()));
        Ok(merged)
    }
}

/// The `classLabel` of the first section (in stored order) that declares one.
///
/// An empty label means the descriptor has no parent. Later sections are
/// ignored even if they declare a different label.
pub fn find_class_label(
    identifier: &str,
    descriptor: &Descriptor,
) -> Result<Option<String>, ResolveError> {
    let Some((section, value)) = descriptor
        .sections
        .iter()
        .find_map(|(name, props)| props.get(CLASS_LABEL).map(|v| (name, v)))
    else {
        return Ok(None);
    };

    match value {
        PropertyValue::Map(_) => Err(ResolveError::MalformedClassLabel {
            identifier: identifier.to_string(),
            section: section.clone(),
            found: value.kind(),
        }),
        scalar => Ok(scalar
            .as_text()
            .filter(|label| !label.is_empty())
            .map(|label| label.into_owned())),
    }
}

/// `[label] + parent_chain`, keeping the first occurrence of each label.
fn compose_chain(label: String, parent_chain: &[String]) -> Vec<String> {
    let mut chain = Vec::with_capacity(parent_chain.len() + 1);
    chain.push(label);
    for ancestor in parent_chain {
        if !chain.contains(ancestor) {
            chain.push(ancestor.clone());
        }
    }
    chain
}

// ===========================================================================
// Tests
// ===========================================================================
