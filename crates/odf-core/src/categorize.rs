//! Partition resolved descriptors into named buckets.
//!
//! Rules are evaluated in order and the first match wins. Identifier rules
//! always take priority over marker rules, so special-cased objects can be
//! moved out of the bucket their sections would otherwise put them in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::{Descriptor, Store};

/// A single categorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryRule {
    /// Matches one identifier, ignoring case.
    Identifier { identifier: String, category: String },
    /// Matches any descriptor that has the named section.
    Marker { section: String, category: String },
}

impl CategoryRule {
    pub fn marker(section: &str, category: &str) -> Self {
        CategoryRule::Marker {
            section: section.to_string(),
            category: category.to_string(),
        }
    }

    pub fn identifier(identifier: &str, category: &str) -> Self {
        CategoryRule::Identifier {
            identifier: identifier.to_string(),
            category: category.to_string(),
        }
    }

    pub fn category(&self) -> &str {
        match self {
            CategoryRule::Identifier { category, .. } | CategoryRule::Marker { category, .. } => category,
        }
    }

    fn matches(&self, identifier: &str, descriptor: &Descriptor) -> bool {
        match self {
            CategoryRule::Identifier { identifier: want, .. } => want.eq_ignore_ascii_case(identifier),
            CategoryRule::Marker { section, .. } => descriptor.has_section(section),
        }
    }
}

/// Categorized output. Every category named by a rule is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categories {
    pub buckets: IndexMap<String, Store>,
    /// Descriptors that matched no rule. They are not emitted.
    pub uncategorized: usize,
}

impl Categories {
    pub fn bucket(&self, category: &str) -> Option<&Store> {
        self.buckets.get(category)
    }
}

/// Ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    categories: Vec<String>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::marker("CraftClass", "Vehicle"),
            CategoryRule::marker("WeaponClass", "Weapon"),
            CategoryRule::marker("PersonClass", "Pilot"),
            CategoryRule::marker("BuildingClass", "Building"),
            CategoryRule::marker("OrdnanceClass", "Ordnance"),
            CategoryRule::marker("WeaponPowerupClass", "Powerup"),
        ])
    }
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for rule in &rules {
            if !categories.iter().any(|c| c == rule.category()) {
                categories.push(rule.category().to_string());
            }
        }
        // Stable: identifier rules first, each group in its given order.
        let (mut ordered, markers): (Vec<_>, Vec<_>) = rules
            .into_iter()
            .partition(|r| matches!(r, CategoryRule::Identifier { .. }));
        ordered.extend(markers);
        Self {
            rules: ordered,
            categories,
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn category_of(&self, identifier: &str, descriptor: &Descriptor) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.matches(identifier, descriptor))
            .map(CategoryRule::category)
    }

    pub fn categorize(&self, store: &Store) -> Categories {
        let mut out = Categories {
            buckets: self
                .categories
                .iter()
                .map(|c| (c.clone(), Store::new()))
                .collect(),
            uncategorized: 0,
        };

        for (id, descriptor) in store.iter() {
            match self.category_of(id, descriptor) {
                Some(category) => {
                    if let Some(bucket) = out.buckets.get_mut(category) {
                        bucket.insert(id, descriptor.clone());
                    }
                }
                None => {
                    debug!(identifier = id, "no category matched");
                    out.uncategorized += 1;
                }
            }
        }

        for (category, bucket) in &out.buckets {
            info!(category = %category, objects = bucket.len(), "categorized");
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
