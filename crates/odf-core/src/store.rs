//! Descriptors and the in-memory record store.
//!
//! A [`Store`] maps identifiers (conventionally `name.odf`) to
//! [`Descriptor`]s. Identifiers keep their original casing in storage;
//! case-insensitive lookups go through an [`IdentifierIndex`].

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::value::{PropertyMap, PropertyValue};

/// Suffix carried by every canonical identifier.
pub const ODF_SUFFIX: &str = ".odf";

/// Property naming a descriptor's parent.
pub const CLASS_LABEL: &str = "classLabel";

/// Top-level key holding the resolved inheritance chain on the wire.
pub const INHERITANCE_CHAIN_KEY: &str = "inheritanceChain";

/// Insertion-ordered mapping of section name to its properties.
pub type Sections = IndexMap<String, PropertyMap>;

/// Lowercase `name` and append [`ODF_SUFFIX`] if it is missing.
pub fn normalize_identifier(name: &str) -> String {
    let mut id = name.to_lowercase();
    if !id.ends_with(ODF_SUFFIX) {
        id.push_str(ODF_SUFFIX);
    }
    id
}

// ===========================================================================
// Descriptor
// ===========================================================================

/// One ODF object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    pub sections: Sections,
    /// `None` until the descriptor has been through the inheritance resolver.
    pub inheritance_chain: Option<Vec<String>>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Sections) -> Self {
        Self {
            sections,
            inheritance_chain: None,
        }
    }

    pub fn section(&self, name: &str) -> Option<&PropertyMap> {
        self.sections.get(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Look up `property` inside `section`.
    pub fn property(&self, section: &str, property: &str) -> Option<&PropertyValue> {
        self.sections.get(section)?.get(property)
    }

    /// Resolved chain, or an empty slice if the descriptor is unresolved.
    pub fn chain(&self) -> &[String] {
        self.inheritance_chain.as_deref().unwrap_or(&[])
    }

    pub fn is_resolved(&self) -> bool {
        self.inheritance_chain.is_some()
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.sections.len() + usize::from(self.inheritance_chain.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, props) in &self.sections {
            map.serialize_entry(name, props)?;
        }
        if let Some(chain) = &self.inheritance_chain {
            map.serialize_entry(INHERITANCE_CHAIN_KEY, chain)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DescriptorVisitor)
    }
}

struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = Descriptor;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of section names to property mappings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Descriptor, A::Error> {
        let mut descriptor = Descriptor::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == INHERITANCE_CHAIN_KEY {
                descriptor.inheritance_chain = Some(access.next_value()?);
                continue;
            }
            match access.next_value::<PropertyValue>()? {
                PropertyValue::Map(props) => {
                    descriptor.sections.insert(key, props);
                }
                other => {
                    return Err(de::Error::custom(format!(
                        "section '{key}' must be a mapping, found a {}",
                        other.kind()
                    )));
                }
            }
        }
        Ok(descriptor)
    }
}

// ===========================================================================
// Store
// ===========================================================================

/// Ordered identifier -> descriptor mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    descriptors: IndexMap<String, Descriptor>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Insert a descriptor, returning the one it replaced. A replaced
    /// identifier keeps its original position.
    pub fn insert(&mut self, identifier: impl Into<String>, descriptor: Descriptor) -> Option<Descriptor> {
        self.descriptors.insert(identifier.into(), descriptor)
    }

    /// Exact (case-sensitive) lookup.
    pub fn get(&self, identifier: &str) -> Option<&Descriptor> {
        self.descriptors.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Descriptor> {
        self.descriptors.get_mut(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.descriptors.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.descriptors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Descriptor)> {
        self.descriptors.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Descriptor)> for Store {
    fn from_iter<I: IntoIterator<Item = (String, Descriptor)>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Store {
    type Item = (String, Descriptor);
    type IntoIter = indexmap::map::IntoIter<String, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

// ===========================================================================
// IdentifierIndex
// ===========================================================================

/// Case-insensitive view over a store's identifiers.
///
/// When two stored identifiers fold to the same lowercase form, the one
/// that comes first in store order is found.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    by_folded: HashMap<String, String>,
}

impl IdentifierIndex {
    pub fn build(store: &Store) -> Self {
        let mut by_folded = HashMap::with_capacity(store.len());
        for id in store.identifiers() {
            by_folded
                .entry(id.to_lowercase())
                .or_insert_with(|| id.to_string());
        }
        Self { by_folded }
    }

    /// Find the stored identifier matching `name` ignoring case.
    pub fn find(&self, name: &str) -> Option<&str> {
        self.by_folded.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Normalize a reference (lowercase, ensure suffix) and find it.
    pub fn resolve_reference(&self, reference: &str) -> Option<&str> {
        self.find(&normalize_identifier(reference))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_suffix_once() {
        assert_eq!(normalize_identifier("Tank"), "tank.odf");
        assert_eq!(normalize_identifier("tank.ODF"), "tank.odf");
        assert_eq!(normalize_identifier("tank.odf"), "tank.odf");
    }

    #[test]
    fn descriptor_round_trips_with_chain_last() {
        let input = r#"{"GameObjectClass":{"classLabel":"tank"},"inheritanceChain":["tank"]}"#;
        let d: Descriptor = serde_json::from_str(input).unwrap();
        assert_eq!(d.chain(), ["tank".to_string()]);
        assert_eq!(serde_json::to_string(&d).unwrap(), input);
    }

    #[test]
    fn unresolved_descriptor_has_no_chain_key() {
        let d: Descriptor = serde_json::from_str(r#"{"A":{"x":1}}"#).unwrap();
        assert!(!d.is_resolved());
        assert!(!serde_json::to_string(&d).unwrap().contains(INHERITANCE_CHAIN_KEY));
    }

    #[test]
    fn scalar_section_is_rejected() {
        let err = serde_json::from_str::<Descriptor>(r#"{"A":5}"#).unwrap_err();
        assert!(err.to_string().contains("section 'A' must be a mapping"));
    }

    #[test]
    fn store_preserves_insertion_order() {
        let store: Store =
            serde_json::from_str(r#"{"b.odf":{},"a.odf":{},"c.odf":{}}"#).unwrap();
        let ids: Vec<_> = store.identifiers().collect();
        assert_eq!(ids, vec!["b.odf", "a.odf", "c.odf"]);
    }

    #[test]
    fn index_finds_ignoring_case() {
        let mut store = Store::new();
        store.insert("Tank.odf", Descriptor::new());
        let index = IdentifierIndex::build(&store);
        assert_eq!(index.find("TANK.ODF"), Some("Tank.odf"));
        assert_eq!(index.resolve_reference("tank"), Some("Tank.odf"));
        assert_eq!(index.find("scout.odf"), None);
    }

    #[test]
    fn index_prefers_first_folded_match() {
        let mut store = Store::new();
        store.insert("Tank.odf", Descriptor::new());
        store.insert("tank.odf", Descriptor::new());
        let index = IdentifierIndex::build(&store);
        assert_eq!(index.find("tank.odf"), Some("Tank.odf"));
    }
}
