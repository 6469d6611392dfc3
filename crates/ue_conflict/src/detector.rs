//! Top-level conflict detection.
//!
//! [`ConflictDetector::detect_conflicts`] runs the whole pipeline:
//!
//! 1. Select the mods to scan (enabled filter, case-insensitive de-duplication).
//! 2. Discover the base game reference containers once, if a base path is set.
//! 3. Build each mod's [`ModIndex`] in its own mount session, sequentially or
//!    fanned out with rayon. Cancellation is checked before every mod.
//! 4. Fan in: feed every index to a [`ConflictResolver`] and assemble the
//!    [`ModConflictResult`].
//!
//! Cancellation is all-or-nothing: once observed, no result is produced.

use crate::adapter::ArchiveAdapter;
use crate::config::ScanConfig;
use crate::diagnostics::DiagnosticLog;
use crate::discovery::{discover, DiscoveredContainers};
use crate::display_name::resolve_display_name;
use crate::error::{Error, Result};
use crate::index::{AssetIndexBuilder, ModIndex};
use crate::model::{mode_description, ModCandidate, ModConflictResult, ModStatus};
use crate::resolver::ConflictResolver;
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

const SCAN_SCOPE: &str = "scan";
const BASE_SCOPE: &str = "base";

/// Knobs that change how a scan runs but not what it finds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Index mods on the rayon pool instead of one after another. Each mod still
    /// gets its own mount session; results are merged after all have finished.
    pub parallel: bool,
}

/// Progress information emitted during a scan.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub stage: ScanStage,
    /// Real name of the mod just indexed (set during `IndexingMod`).
    pub current_mod: Option<String>,
    /// Mods indexed so far. In parallel scans this counts completions.
    pub current: u32,
    pub total: u32,
}

/// Emitted in order: `Discovering` -> `IndexingMod` (repeated) -> `Resolving` -> `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanStage {
    Discovering,
    IndexingMod,
    Resolving,
    Complete,
}

type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

/// One mod's contribution, before fan-in.
struct ScannedMod {
    real_name: String,
    display_name: String,
    index: ModIndex,
    log: DiagnosticLog,
}

/// Conflict detection engine.
///
/// Construct with a [`ScanConfig`], optionally swap the adapter or options,
/// then call [`detect_conflicts`](Self::detect_conflicts).
pub struct ConflictDetector {
    config: ScanConfig,
    adapter: ArchiveAdapter,
    options: ScanOptions,
    progress_callback: Option<ProgressCallback>,
}

impl ConflictDetector {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            adapter: ArchiveAdapter::default(),
            options: ScanOptions::default(),
            progress_callback: None,
        }
    }

    /// Replace the default strategy chain.
    pub fn with_adapter(mut self, adapter: ArchiveAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a progress callback. In parallel scans it is called from worker
    /// threads.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `mods` and report every asset path provided by more than one of them.
    ///
    /// Enabled mods are read from `enabled_root/<real name>`, backed-up mods from
    /// `backup_root/<real name>`. With `enabled_only`, backed-up mods are not
    /// scanned at all.
    ///
    /// Per-mod failures never abort the scan; they leave that mod with fewer
    /// (or no) assets and a trail in [`ModConflictResult::diagnostics`]. The only
    /// error from the scan itself is [`Error::Cancelled`], returned as soon as
    /// `cancel` is observed set.
    pub fn detect_conflicts(
        &self,
        enabled_root: &Utf8Path,
        backup_root: Option<&Utf8Path>,
        mods: &[ModCandidate],
        enabled_only: bool,
        cancel: &AtomicBool,
    ) -> Result<ModConflictResult> {
        let start_time = Instant::now();
        let mut log = DiagnosticLog::new();
        check_cancelled(cancel)?;

        let selected = select_candidates(mods, enabled_only, &mut log);
        log.info(
            SCAN_SCOPE,
            format!(
                "Scanning {} mods ({}), engine {}, parallel: {}",
                selected.len(),
                mode_description(enabled_only),
                self.config.engine_version,
                self.options.parallel
            ),
        );

        let total = selected.len() as u32;
        self.emit_progress(ScanProgress {
            stage: ScanStage::Discovering,
            current_mod: None,
            current: 0,
            total,
        });
        let reference = self.discover_reference(&mut log);

        let mut builder = AssetIndexBuilder::new(&self.adapter, &self.config);
        if let Some(reference) = &reference {
            builder = builder.with_reference(reference);
        }

        let done = AtomicU32::new(0);
        let scan_one = |candidate: &ModCandidate| -> Result<ScannedMod> {
            check_cancelled(cancel)?;
            let mod_dir = mod_directory(candidate, enabled_root, backup_root);
            let scanned = self.scan_mod(&builder, candidate, mod_dir.as_deref());
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            self.emit_progress(ScanProgress {
                stage: ScanStage::IndexingMod,
                current_mod: Some(candidate.real_name.clone()),
                current,
                total,
            });
            Ok(scanned)
        };

        let scanned: Vec<ScannedMod> = if self.options.parallel {
            selected
                .par_iter()
                .map(|candidate| scan_one(candidate))
                .collect::<Result<_>>()?
        } else {
            selected
                .iter()
                .map(|candidate| scan_one(candidate))
                .collect::<Result<_>>()?
        };
        check_cancelled(cancel)?;

        self.emit_progress(ScanProgress {
            stage: ScanStage::Resolving,
            current_mod: None,
            current: total,
            total,
        });
        let mut resolver = ConflictResolver::new();
        for scanned in scanned {
            resolver.add_index(&scanned.real_name, &scanned.display_name, &scanned.index);
            log.extend(scanned.log);
        }
        let resolution = resolver.resolve();

        log.info(
            SCAN_SCOPE,
            format!(
                "Scan complete: {} mods, {} assets, {} conflicting paths",
                selected.len(),
                resolution.total_assets,
                resolution.conflict_asset_count
            ),
        );
        self.emit_progress(ScanProgress {
            stage: ScanStage::Complete,
            current_mod: None,
            current: total,
            total,
        });

        Ok(ModConflictResult {
            scanned_mods: selected.len(),
            total_assets: resolution.total_assets,
            conflict_asset_count: resolution.conflict_asset_count,
            conflicts: resolution.conflicts,
            summaries: resolution.summaries,
            mode_description: mode_description(enabled_only).to_string(),
            elapsed: start_time.elapsed(),
            diagnostics: log.into_entries(),
        })
    }

    fn discover_reference(&self, log: &mut DiagnosticLog) -> Option<DiscoveredContainers> {
        let base = self.config.game_base_path.as_deref()?;
        let paks = base.join("Content").join("Paks");
        let found = discover(&paks, BASE_SCOPE, log);
        log.info(
            BASE_SCOPE,
            format!("{} reference containers under {}", found.len(), paks),
        );
        (!found.is_empty()).then_some(found)
    }

    fn scan_mod(
        &self,
        builder: &AssetIndexBuilder<'_>,
        candidate: &ModCandidate,
        mod_dir: Option<&Utf8Path>,
    ) -> ScannedMod {
        let mut log = DiagnosticLog::new();
        let scope = candidate.real_name.as_str();

        let Some(mod_dir) = mod_dir else {
            log.warn(scope, "Backed-up mod but no backup root configured");
            return ScannedMod {
                real_name: candidate.real_name.clone(),
                display_name: candidate.real_name.clone(),
                index: ModIndex::default(),
                log,
            };
        };

        let index = builder.build_index(candidate, mod_dir, &mut log);
        let display_name =
            resolve_display_name(mod_dir).unwrap_or_else(|| candidate.real_name.clone());
        if display_name != candidate.real_name {
            log.debug(scope, format!("Display name: {}", display_name));
        }

        ScannedMod {
            real_name: candidate.real_name.clone(),
            display_name,
            index,
            log,
        }
    }

    fn emit_progress(&self, progress: ScanProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

fn check_cancelled(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        tracing::info!("Conflict scan cancelled");
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Apply the enabled filter, then drop repeated real names (ignoring case),
/// keeping the first occurrence.
fn select_candidates(
    mods: &[ModCandidate],
    enabled_only: bool,
    log: &mut DiagnosticLog,
) -> Vec<ModCandidate> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for candidate in mods {
        if enabled_only && candidate.status != ModStatus::Enabled {
            continue;
        }
        if !seen.insert(candidate.real_name.to_lowercase()) {
            log.debug(
                SCAN_SCOPE,
                format!("Skipping duplicate mod {}", candidate.real_name),
            );
            continue;
        }
        selected.push(candidate.clone());
    }
    selected
}

fn mod_directory(
    candidate: &ModCandidate,
    enabled_root: &Utf8Path,
    backup_root: Option<&Utf8Path>,
) -> Option<Utf8PathBuf> {
    match candidate.status {
        ModStatus::Enabled => Some(enabled_root.join(&candidate.real_name)),
        ModStatus::BackedUp => backup_root.map(|root| root.join(&candidate.real_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_filters_and_dedups() {
        let mods = [
            ModCandidate::enabled("Hero"),
            ModCandidate::backed_up("Cape"),
            ModCandidate::enabled("HERO"),
            ModCandidate::enabled("Map"),
        ];
        let mut log = DiagnosticLog::new();

        let names = |v: Vec<ModCandidate>| v.into_iter().map(|c| c.real_name).collect::<Vec<_>>();
        assert_eq!(names(select_candidates(&mods, true, &mut log)), ["Hero", "Map"]);
        assert_eq!(
            names(select_candidates(&mods, false, &mut log)),
            ["Hero", "Cape", "Map"]
        );
    }

    #[test]
    fn test_mod_directory_by_status() {
        let enabled = Utf8Path::new("/mods");
        let backup = Utf8Path::new("/backup");
        assert_eq!(
            mod_directory(&ModCandidate::enabled("A"), enabled, Some(backup)),
            Some(Utf8PathBuf::from("/mods/A"))
        );
        assert_eq!(
            mod_directory(&ModCandidate::backed_up("B"), enabled, Some(backup)),
            Some(Utf8PathBuf::from("/backup/B"))
        );
        assert_eq!(mod_directory(&ModCandidate::backed_up("B"), enabled, None), None);
    }

    #[test]
    fn test_cancel_before_start() {
        let detector = ConflictDetector::new(ScanConfig::default());
        let cancel = AtomicBool::new(true);
        let err = detector
            .detect_conflicts(Utf8Path::new("/nonexistent"), None, &[], false, &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
