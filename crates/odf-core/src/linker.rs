//! Cross-object reference linking.
//!
//! Runs after inheritance resolution. Two passes attach data that ODFs
//! reference by name rather than by inheritance:
//!
//! - **Ordnance**: a weapon's `WeaponClass.ordName` names its projectile.
//!   Every section of the ordnance is copied into the weapon as
//!   `Ordnance.<section>`.
//! - **Powerup**: a powerup's `WeaponPowerupClass.weaponName` names the
//!   weapon it grants. Every powerup section is copied into the weapon as
//!   `Powerup.<section>`, and the weapon's display name is backfilled from
//!   the powerup when missing.
//!
//! Both passes read from a snapshot taken before the first pass and write
//! into the live store. Missing targets produce a [`LinkWarning`]; they never
//! abort the batch. Links are resolved exactly one hop.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::store::{Descriptor, IdentifierIndex, Store, normalize_identifier};

/// Section-name prefix for attached ordnance sections.
pub const ORDNANCE_PREFIX: &str = "Ordnance.";

/// Section-name prefix for attached powerup sections.
pub const POWERUP_PREFIX: &str = "Powerup.";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Names of the sections and properties the linker reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSchema {
    /// Weapon-class section, also the weapon's core identity section.
    pub weapon_section: String,
    /// Property in the weapon section naming the ordnance.
    pub ordnance_property: String,
    /// Display-name property in the weapon section.
    pub weapon_display_property: String,
    /// Powerup-class section.
    pub powerup_section: String,
    /// Property in the powerup section naming the granted weapon.
    pub powerup_weapon_property: String,
    /// Section holding the powerup's own display name.
    pub powerup_display_section: String,
    /// Property holding the powerup's own display name.
    pub powerup_display_property: String,
}

impl Default for LinkSchema {
    fn default() -> Self {
        Self {
            weapon_section: "WeaponClass".to_string(),
            ordnance_property: "ordName".to_string(),
            weapon_display_property: "wpnName".to_string(),
            powerup_section: "WeaponPowerupClass".to_string(),
            powerup_weapon_property: "weaponName".to_string(),
            powerup_display_section: "GameObjectClass".to_string(),
            powerup_display_property: "unitName".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A reference whose target is not in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkWarning {
    MissingOrdnance { weapon: String, ordnance: String },
    MissingWeapon { powerup: String, weapon: String },
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkWarning::MissingOrdnance { weapon, ordnance } => {
                write!(f, "weapon '{weapon}' references missing ordnance '{ordnance}'")
            }
            LinkWarning::MissingWeapon { powerup, weapon } => {
                write!(f, "powerup '{powerup}' references missing weapon '{weapon}'")
            }
        }
    }
}

/// Outcome of one [`ReferenceLinker::link`] run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkReport {
    pub ordnance_links: usize,
    pub powerup_links: usize,
    pub backfilled_names: usize,
    pub warnings: Vec<LinkWarning>,
}

// ---------------------------------------------------------------------------
// Linker
// ---------------------------------------------------------------------------

/// Attaches ordnance and powerup data to weapons.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLinker {
    schema: LinkSchema,
    guarded: bool,
}

impl ReferenceLinker {
    pub fn new(schema: LinkSchema) -> Self {
        Self {
            schema,
            guarded: false,
        }
    }

    /// In guarded mode, source sections that already carry a link prefix and
    /// target sections that already exist are skipped, so running the linker
    /// again over its own output changes nothing.
    pub fn guarded(mut self, guarded: bool) -> Self {
        self.guarded = guarded;
        self
    }

    pub fn schema(&self) -> &LinkSchema {
        &self.schema
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    /// Run the ordnance pass, then the powerup pass.
    pub fn link(&self, store: &mut Store) -> LinkReport {
        let snapshot = store.clone();
        let index = IdentifierIndex::build(&snapshot);
        let mut report = LinkReport::default();

        self.link_ordnance(store, &snapshot, &index, &mut report);
        self.link_powerups(store, &snapshot, &index, &mut report);

        info!(
            ordnance = report.ordnance_links,
            powerups = report.powerup_links,
            backfilled = report.backfilled_names,
            warnings = report.warnings.len(),
            "linked references"
        );
        report
    }

    fn link_ordnance(
        &self,
        store: &mut Store,
        snapshot: &Store,
        index: &IdentifierIndex,
        report: &mut LinkReport,
    ) {
        let s = &self.schema;
        for (weapon_id, weapon) in snapshot.iter() {
            let Some(name) = weapon
                .property(&s.weapon_section, &s.ordnance_property)
                .and_then(|v| v.as_text())
            else {
                continue;
            };
            if name.is_empty() || name.eq_ignore_ascii_case("NULL") {
                continue;
            }

            let Some(ordnance_id) = index.resolve_reference(&name) else {
                report_missing(
                    report,
                    LinkWarning::MissingOrdnance {
                        weapon: weapon_id.to_string(),
                        ordnance: normalize_identifier(&name),
                    },
                );
                continue;
            };

            if let (Some(target), Some(ordnance)) = (store.get_mut(weapon_id), snapshot.get(ordnance_id)) {
                self.attach(target, snapshot.get(weapon_id), ORDNANCE_PREFIX, ordnance);
                report.ordnance_links += 1;
            }
        }
    }

    fn link_powerups(
        &self,
        store: &mut Store,
        snapshot: &Store,
        index: &IdentifierIndex,
        report: &mut LinkReport,
    ) {
        let s = &self.schema;
        for (powerup_id, powerup) in snapshot.iter() {
            let Some(name) = powerup
                .property(&s.powerup_section, &s.powerup_weapon_property)
                .and_then(|v| v.as_text())
            else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let Some(weapon_id) = index.resolve_reference(&name) else {
                report_missing(
                    report,
                    LinkWarning::MissingWeapon {
                        powerup: powerup_id.to_string(),
                        weapon: normalize_identifier(&name),
                    },
                );
                continue;
            };
            let Some(target) = store.get_mut(weapon_id) else {
                continue;
            };

            if self.backfill_display_name(target, powerup) {
                report.backfilled_names += 1;
            }
            self.attach(target, snapshot.get(weapon_id), POWERUP_PREFIX, powerup);
            report.powerup_links += 1;
        }
    }

    /// Copy the powerup's display name into the weapon section when the
    /// weapon has none. Returns whether a name was written.
    fn backfill_display_name(&self, weapon: &mut Descriptor, powerup: &Descriptor) -> bool {
        let s = &self.schema;
        if weapon
            .property(&s.weapon_section, &s.weapon_display_property)
            .is_some()
        {
            return false;
        }
        let Some(display) = powerup
            .property(&s.powerup_display_section, &s.powerup_display_property)
            .filter(|v| v.as_text().is_some_and(|t| !t.is_empty()))
        else {
            return false;
        };
        weapon
            .sections
            .entry(s.weapon_section.clone())
            .or_default()
            .insert(s.weapon_display_property.clone(), display.clone());
        true
    }

    /// Copy every section of `source` into `target` under `prefix`.
    ///
    /// The guard compares against `before`, the target as it was in the
    /// snapshot, so several sources linking into one target in the same run
    /// all attach.
    fn attach(
        &self,
        target: &mut Descriptor,
        before: Option<&Descriptor>,
        prefix: &str,
        source: &Descriptor,
    ) {
        for (name, props) in &source.sections {
            if self.guarded && is_linked_section(name) {
                continue;
            }
            let key = format!("{prefix}{name}");
            if self.guarded && before.is_some_and(|b| b.sections.contains_key(&key)) {
                continue;
            }
            target.sections.insert(key, props.clone());
        }
    }
}

/// Whether a section was produced by a previous link pass.
pub fn is_linked_section(name: &str) -> bool {
    name.starts_with(ORDNANCE_PREFIX) || name.starts_with(POWERUP_PREFIX)
}

fn report_missing(report: &mut LinkReport, warning: LinkWarning) {
    warn!("{warning}");
    report.warnings.push(warning);
}

// ===========================================================================
// Tests
// ===========================================================================
