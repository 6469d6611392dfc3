//! Conflict resolution over per-mod asset indexes.
//!
//! Pure computation: feed each mod's paths in with [`ConflictResolver::add_mod`],
//! then [`resolve`](ConflictResolver::resolve). Accounting is keyed on the
//! mod's real name; display names only decorate the output.

use crate::index::ModIndex;
use crate::model::{ConflictEntry, ModConflictSummary};
use crate::paths::asset_key;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Conflicting paths kept per summary.
pub const SAMPLE_LIMIT: usize = 5;

#[derive(Debug)]
struct ModSlot {
    real_name: String,
    display_name: String,
    asset_count: usize,
}

#[derive(Debug)]
struct Providers {
    /// Path as first seen.
    path: String,
    slots: BTreeSet<usize>,
}

#[derive(Debug, Default)]
pub struct ConflictResolver {
    mods: Vec<ModSlot>,
    slot_by_name: HashMap<String, usize>,
    path_to_mods: BTreeMap<String, Providers>,
}

/// Output of [`ConflictResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub conflicts: Vec<ConflictEntry>,
    pub summaries: Vec<ModConflictSummary>,
    pub total_assets: usize,
    pub conflict_asset_count: usize,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mod and the paths it provides.
    ///
    /// A real name already registered (ignoring case) is the same mod: its paths
    /// are merged and the first display name is kept. A mod with no paths still
    /// gets a summary.
    pub fn add_mod<I, S>(&mut self, real_name: &str, display_name: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = real_name.to_lowercase();
        let slot = match self.slot_by_name.get(&key) {
            Some(&slot) => slot,
            None => {
                self.mods.push(ModSlot {
                    real_name: real_name.to_string(),
                    display_name: display_name.to_string(),
                    asset_count: 0,
                });
                self.slot_by_name.insert(key, self.mods.len() - 1);
                self.mods.len() - 1
            }
        };

        for path in paths {
            let path = path.as_ref();
            let providers = self
                .path_to_mods
                .entry(asset_key(path))
                .or_insert_with(|| Providers {
                    path: path.to_string(),
                    slots: BTreeSet::new(),
                });
            if providers.slots.insert(slot) {
                self.mods[slot].asset_count += 1;
            }
        }
    }

    pub fn add_index(&mut self, real_name: &str, display_name: &str, index: &ModIndex) {
        self.add_mod(real_name, display_name, index.paths());
    }

    pub fn mod_count(&self) -> usize {
        self.mods.len()
    }

    pub fn resolve(&self) -> Resolution {
        let mut conflicts = Vec::new();
        let mut per_mod: Vec<Vec<&str>> = vec![Vec::new(); self.mods.len()];

        for providers in self.path_to_mods.values() {
            if providers.slots.len() < 2 {
                continue;
            }
            let mut names: Vec<String> = providers
                .slots
                .iter()
                .map(|&slot| self.mods[slot].display_name.clone())
                .collect();
            names.sort_by(|a, b| {
                a.to_lowercase()
                    .cmp(&b.to_lowercase())
                    .then_with(|| a.cmp(b))
            });

            for &slot in &providers.slots {
                per_mod[slot].push(&providers.path);
            }
            conflicts.push(ConflictEntry {
                asset_path: providers.path.clone(),
                providing_mods: names,
            });
        }

        let mut summaries: Vec<ModConflictSummary> = self
            .mods
            .iter()
            .zip(&per_mod)
            .map(|(slot, paths)| ModConflictSummary {
                display_name: slot.display_name.clone(),
                real_name: slot.real_name.clone(),
                conflict_count: paths.len(),
                sample_conflict_paths: paths
                    .iter()
                    .take(SAMPLE_LIMIT)
                    .map(|p| p.to_string())
                    .collect(),
            })
            .collect();
        summaries.sort_by(|a, b| b.conflict_count.cmp(&a.conflict_count));

        Resolution {
            conflict_asset_count: conflicts.len(),
            conflicts,
            summaries,
            total_assets: self.mods.iter().map(|m| m.asset_count).sum(),
        }
    }
}
