//! Deep merge of child and parent property mappings.
//!
//! The result starts as a copy of the parent. Every child key is overlaid:
//! when both sides hold a mapping they are merged recursively, otherwise the
//! child value replaces the parent's. Keys shared with the parent keep the
//! parent's position; child-only keys are appended in child order.

use crate::store::Sections;
use crate::value::{PropertyMap, PropertyValue};

/// Merge two property mappings, `child` taking precedence at every depth.
pub fn merge(child: &PropertyMap, parent: &PropertyMap) -> PropertyMap {
    let mut merged = parent.clone();
    for (key, value) in child {
        let combined = match (value, merged.get(key)) {
            (PropertyValue::Map(c), Some(PropertyValue::Map(p))) => PropertyValue::Map(merge(c, p)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Merge at the whole-descriptor level, where every value is a section.
pub fn merge_sections(child: &Sections, parent: &Sections) -> Sections {
    let mut merged = parent.clone();
    for (name, props) in child {
        let combined = match merged.get(name) {
            Some(inherited) => merge(props, inherited),
            None => props.clone(),
        };
        merged.insert(name.clone(), combined);
    }
    merged
}
