//! Property-based tests for ODF resolution.
//!
//! Uses proptest to generate random property maps and descriptor stores,
//! then verify merge precedence, resolver idempotence and cycle safety.

use odf_core::store::{Descriptor, Sections, Store};
use odf_core::value::{PropertyMap, PropertyValue};
use odf_core::{InheritanceResolver, merge};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from)
}

fn arb_leaf() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        (-50i64..50).prop_map(PropertyValue::Integer),
        "[a-z]{1,3}".prop_map(PropertyValue::String),
    ]
}

fn arb_value() -> impl Strategy<Value = PropertyValue> {
    arb_leaf().prop_recursive(2, 16, 3, |inner| {
        proptest::collection::vec((arb_key(), inner), 0..3)
            .prop_map(|entries| PropertyValue::Map(entries.into_iter().collect()))
    })
}

fn arb_map() -> impl Strategy<Value = PropertyMap> {
    proptest::collection::vec((arb_key(), arb_value()), 0..5)
        .prop_map(|entries| entries.into_iter().collect())
}

type Shape = (Option<usize>, Vec<(String, i64)>);

fn arb_props() -> impl Strategy<Value = Vec<(String, i64)>> {
    proptest::collection::vec((arb_key(), -100i64..100), 0..4)
}

/// Build a store of `objN.odf` descriptors, each with one `CraftClass`
/// section whose optional `classLabel` points at `objP`.
fn build_store(shapes: &[Shape]) -> Store {
    shapes
        .iter()
        .enumerate()
        .map(|(i, (parent, values))| {
            let mut section = PropertyMap::new();
            if let Some(p) = parent {
                section.insert("classLabel".to_string(), PropertyValue::from(format!("Obj{p}")));
            }
            for (k, v) in values {
                section.insert(k.clone(), PropertyValue::Integer(*v));
            }
            let mut sections = Sections::new();
            sections.insert("CraftClass".to_string(), section);
            (format!("obj{i}.odf"), Descriptor::from_sections(sections))
        })
        .collect()
}

/// Stores whose labels only point forward (or past the end), so no cycles.
fn arb_acyclic_store(max: usize) -> impl Strategy<Value = Store> {
    (1..=max).prop_flat_map(|n| {
        proptest::collection::vec((proptest::option::of(0..3usize), arb_props()), n).prop_map(
            |raw| {
                let shapes: Vec<Shape> = raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, (step, props))| (step.map(|s| i + 1 + s), props))
                    .collect();
                build_store(&shapes)
            },
        )
    })
}

/// Stores whose labels point anywhere, including themselves.
fn arb_any_store(max: usize) -> impl Strategy<Value = Store> {
    (1..=max).prop_flat_map(|n| {
        proptest::collection::vec((proptest::option::of(0..n + 1), arb_props()), n)
            .prop_map(|shapes| build_store(&shapes))
    })
}

// ===========================================================================
// Helpers
// ===========================================================================

fn check_precedence(
    child: &PropertyMap,
    parent: &PropertyMap,
    merged: &PropertyMap,
) -> Result<(), TestCaseError> {
    for (key, value) in child {
        match (value, parent.get(key)) {
            (PropertyValue::Map(c), Some(PropertyValue::Map(p))) => {
                let m = merged[key].as_map().expect("merged value should be a map");
                check_precedence(c, p, m)?;
            }
            _ => prop_assert_eq!(&merged[key], value),
        }
    }
    for (key, value) in parent {
        if !child.contains_key(key) {
            prop_assert_eq!(&merged[key], value);
        }
    }
    prop_assert!(merged.keys().all(|k| child.contains_key(k) || parent.contains_key(k)));
    Ok(())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The child's value appears at every depth it defines one; the parent's
    /// value appears only where the child is silent.
    #[test]
    fn merge_respects_child_precedence(child in arb_map(), parent in arb_map()) {
        let merged = merge(&child, &parent);
        check_precedence(&child, &parent, &merged)?;
    }

    /// Merging a child with itself changes nothing.
    #[test]
    fn merge_with_self_is_identity(map in arb_map()) {
        prop_assert_eq!(merge(&map, &map), map);
    }

    /// resolve(resolve(S)) == resolve(S) for acyclic stores.
    #[test]
    fn resolution_is_idempotent(store in arb_acyclic_store(8)) {
        let once = InheritanceResolver::new(&store).resolve_all().unwrap();
        let twice = InheritanceResolver::new(&once).resolve_all().unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Arbitrary labels, cycles included, always terminate and keep every
    /// identifier.
    #[test]
    fn resolution_terminates_and_keeps_all(store in arb_any_store(8)) {
        let resolved = InheritanceResolver::new(&store).resolve_all().unwrap();
        prop_assert_eq!(resolved.len(), store.len());
        for ((a, _), (b, d)) in store.iter().zip(resolved.iter()) {
            prop_assert_eq!(a, b);
            prop_assert!(d.is_resolved());
        }
    }

    /// Chains start with the descriptor's own label and never repeat.
    #[test]
    fn chains_are_deduplicated(store in arb_any_store(8)) {
        let resolved = InheritanceResolver::new(&store).resolve_all().unwrap();
        for (id, d) in resolved.iter() {
            let chain = d.chain();
            let mut seen = std::collections::HashSet::new();
            prop_assert!(chain.iter().all(|l| seen.insert(l.clone())));

            let own = store.get(id).unwrap().property("CraftClass", "classLabel");
            match own {
                Some(label) => prop_assert_eq!(Some(chain[0].as_str()), label.as_str()),
                None => prop_assert!(chain.is_empty()),
            }
        }
    }
}
