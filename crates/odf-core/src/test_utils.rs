//! Shared test helpers for unit tests, property tests and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::store::{Descriptor, Sections, Store};
use crate::value::{PropertyMap, PropertyValue};

// ===========================================================================
// Builders
// ===========================================================================

pub fn props(entries: &[(&str, PropertyValue)]) -> PropertyMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn sections(entries: &[(&str, PropertyMap)]) -> Sections {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn descriptor(entries: &[(&str, PropertyMap)]) -> Descriptor {
    Descriptor::from_sections(sections(entries))
}

pub fn store(entries: &[(&str, Descriptor)]) -> Store {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ===========================================================================
// ODF fixtures
// ===========================================================================

/// Descriptor with a single section declaring `classLabel`.
pub fn labelled(section: &str, label: &str) -> Descriptor {
    descriptor(&[(section, props(&[("classLabel", label.into())]))])
}

/// Weapon descriptor whose `WeaponClass.ordName` is `ordnance`.
pub fn weapon(ordnance: &str) -> Descriptor {
    descriptor(&[("WeaponClass", props(&[("ordName", ordnance.into())]))])
}

/// Powerup descriptor granting `weapon`, optionally with a display name.
pub fn powerup(weapon: &str, unit_name: Option<&str>) -> Descriptor {
    let mut d = descriptor(&[(
        "WeaponPowerupClass",
        props(&[("weaponName", weapon.into())]),
    )]);
    if let Some(name) = unit_name {
        d.sections.insert(
            "GameObjectClass".to_string(),
            props(&[("unitName", name.into())]),
        );
    }
    d
}
