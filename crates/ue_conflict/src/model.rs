//! Scan inputs and outputs.

use crate::diagnostics::DiagnosticEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Where a mod currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModStatus {
    /// Installed under the enabled mods root.
    Enabled,
    /// Parked under the backup library root.
    BackedUp,
}

/// A mod to consider for conflict detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModCandidate {
    /// Cosmetic name supplied by the caller. Not used as a key.
    pub display_name: String,
    /// Directory name of the mod; the identity used for conflict accounting.
    pub real_name: String,
    pub status: ModStatus,
}

impl ModCandidate {
    pub fn new(real_name: impl Into<String>, status: ModStatus) -> Self {
        let real_name = real_name.into();
        Self {
            display_name: real_name.clone(),
            real_name,
            status,
        }
    }

    pub fn enabled(real_name: impl Into<String>) -> Self {
        Self::new(real_name, ModStatus::Enabled)
    }

    pub fn backed_up(real_name: impl Into<String>) -> Self {
        Self::new(real_name, ModStatus::BackedUp)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// An asset path provided by two or more mods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    pub asset_path: String,
    /// Display names of the providers, sorted case-insensitively. Always two or more.
    pub providing_mods: Vec<String>,
}

/// Per-mod conflict tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModConflictSummary {
    pub display_name: String,
    pub real_name: String,
    /// Distinct asset paths this mod shares with at least one other mod.
    pub conflict_count: usize,
    /// First conflicting paths in asset path order, at most five.
    pub sample_conflict_paths: Vec<String>,
}

/// Outcome of one [`detect_conflicts`](crate::ConflictDetector::detect_conflicts) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModConflictResult {
    /// Unique mods scanned, after the enabled filter and de-duplication.
    pub scanned_mods: usize,
    /// Sum of each mod's distinct asset count; paths shared by mods count once per mod.
    pub total_assets: usize,
    pub conflict_asset_count: usize,
    /// Sorted by asset path, case-insensitively.
    pub conflicts: Vec<ConflictEntry>,
    /// Sorted by conflict count, highest first; ties keep scan order.
    pub summaries: Vec<ModConflictSummary>,
    pub mode_description: String,
    pub elapsed: Duration,
    #[serde(default)]
    pub diagnostics: Vec<DiagnosticEntry>,
}

impl ModConflictResult {
    /// Conflict counts keyed by lowercased real name, for callers that keep a
    /// lookup of badges or warnings per mod.
    pub fn conflict_counts(&self) -> HashMap<String, usize> {
        self.summaries
            .iter()
            .map(|s| (s.real_name.to_lowercase(), s.conflict_count))
            .collect()
    }

    /// Conflict count for one mod, matched case-insensitively. `0` when unknown.
    pub fn conflict_count_for(&self, real_name: &str) -> usize {
        self.summaries
            .iter()
            .find(|s| s.real_name.to_lowercase() == real_name.to_lowercase())
            .map_or(0, |s| s.conflict_count)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Human-readable description of the scan mode.
pub fn mode_description(enabled_only: bool) -> &'static str {
    if enabled_only {
        "Enabled mods only"
    } else {
        "All mods (enabled + backup library)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(real: &str, count: usize) -> ModConflictSummary {
        ModConflictSummary {
            display_name: real.to_string(),
            real_name: real.to_string(),
            conflict_count: count,
            sample_conflict_paths: Vec::new(),
        }
    }

    #[test]
    fn test_conflict_counts_are_case_insensitive() {
        let result = ModConflictResult {
            scanned_mods: 2,
            total_assets: 3,
            conflict_asset_count: 1,
            conflicts: Vec::new(),
            summaries: vec![summary("Hero_A", 1), summary("Hero_B", 0)],
            mode_description: mode_description(true).to_string(),
            elapsed: Duration::from_millis(5),
            diagnostics: Vec::new(),
        };

        assert_eq!(result.conflict_counts().get("hero_a"), Some(&1));
        assert_eq!(result.conflict_count_for("HERO_A"), 1);
        assert_eq!(result.conflict_count_for("missing"), 0);
    }

    #[test]
    fn test_candidate_serializes_camel_case() {
        let json = serde_json::to_value(ModCandidate::backed_up("Cape")).unwrap();
        assert_eq!(json["realName"], "Cape");
        assert_eq!(json["displayName"], "Cape");
        assert_eq!(json["status"], "backedUp");
    }

    #[test]
    fn test_mode_descriptions() {
        assert_eq!(mode_description(true), "Enabled mods only");
        assert_eq!(mode_description(false), "All mods (enabled + backup library)");
    }
}
