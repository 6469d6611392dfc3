//! Per-mod asset indexing.
//!
//! [`AssetIndexBuilder::build_index`] turns one mod directory into the set of
//! package paths that mod provides:
//!
//! 1. Discover the mod's containers and note their file names; that set is the
//!    attribution filter.
//! 2. Open a [`MountSession`], mount the base game reference containers (if
//!    any), then the mod's own.
//! 3. Keep package entries whose backing container is one of the mod's own.
//!    Entries with an unknown backing container are discarded, never guessed.
//! 4. Normalize the survivors into package paths.
//! 5. If nothing survived, fall back to loose `.uasset`/`.umap` files on disk,
//!    normalized the same way.

use crate::adapter::ArchiveAdapter;
use crate::config::ScanConfig;
use crate::diagnostics::DiagnosticLog;
use crate::discovery::{discover, find_files, AllowedContainers, DiscoveredContainers};
use crate::model::ModCandidate;
use crate::paths::{asset_key, is_package_path, normalize_asset_path, PACKAGE_EXTENSIONS};
use crate::session::{MountRole, MountSession, MountedFile};
use camino::Utf8Path;
use std::collections::BTreeMap;

/// Counters from one attribution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributionStats {
    /// Every entry in the session, any type, any owner.
    pub entries: usize,
    /// Entries that are packages.
    pub packages: usize,
    pub kept: usize,
    /// Packages from a container outside the mod.
    pub foreign: usize,
    /// Packages whose backing container is unknown.
    pub ambiguous: usize,
}

/// Keep the package entries that belong to `allowed` containers.
///
/// With an empty allow list every package is kept. Otherwise an entry must
/// name its backing container and that container must be in the list.
pub fn attribute_entries<'f>(
    files: impl IntoIterator<Item = &'f MountedFile>,
    allowed: &AllowedContainers,
) -> (Vec<&'f str>, AttributionStats) {
    let mut stats = AttributionStats::default();
    let mut kept = Vec::new();

    for file in files {
        stats.entries += 1;
        if !is_package_path(&file.path) {
            continue;
        }
        stats.packages += 1;

        if !allowed.is_empty() {
            match file.backing.as_deref() {
                None => {
                    stats.ambiguous += 1;
                    continue;
                }
                Some(name) if !allowed.contains(name) => {
                    stats.foreign += 1;
                    continue;
                }
                Some(_) => {}
            }
        }

        stats.kept += 1;
        kept.push(file.path.as_str());
    }

    (kept, stats)
}

/// Where a [`ModIndex`] got its paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexSource {
    Containers,
    LooseFiles,
    #[default]
    Empty,
}

/// The distinct asset paths one mod provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModIndex {
    /// Case-folded key -> path with original casing (first seen wins).
    assets: BTreeMap<String, String>,
    source: IndexSource,
    stats: AttributionStats,
    containers_mounted: usize,
}

impl ModIndex {
    pub fn from_paths<I, S>(paths: I, source: IndexSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self {
            source,
            ..Self::default()
        };
        for path in paths {
            index.insert(path.into());
        }
        index
    }

    /// Add a path. Returns `false` if a path with the same key was already present.
    pub fn insert(&mut self, path: String) -> bool {
        let key = asset_key(&path);
        if self.assets.contains_key(&key) {
            return false;
        }
        self.assets.insert(key, path);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(&asset_key(path))
    }

    /// Paths with original casing, ordered case-insensitively.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.assets.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn source(&self) -> IndexSource {
        self.source
    }

    pub fn stats(&self) -> AttributionStats {
        self.stats
    }

    pub fn containers_mounted(&self) -> usize {
        self.containers_mounted
    }
}

/// Loose package files under `mod_dir`, as paths relative to it with forward
/// slashes. Extensions are kept.
pub fn scan_loose_files(mod_dir: &Utf8Path) -> Vec<String> {
    if !mod_dir.is_dir() {
        return Vec::new();
    }
    find_files(mod_dir, &PACKAGE_EXTENSIONS)
        .into_iter()
        .filter_map(|path| {
            let rel = path.strip_prefix(mod_dir).ok()?;
            Some(rel.as_str().replace('\\', "/"))
        })
        .collect()
}

/// Builds [`ModIndex`]es for one scan.
pub struct AssetIndexBuilder<'a> {
    adapter: &'a ArchiveAdapter,
    config: &'a ScanConfig,
    reference: Option<&'a DiscoveredContainers>,
}

impl<'a> AssetIndexBuilder<'a> {
    pub fn new(adapter: &'a ArchiveAdapter, config: &'a ScanConfig) -> Self {
        Self {
            adapter,
            config,
            reference: None,
        }
    }

    /// Mount `reference` containers ahead of each mod's own. They only give the
    /// session context and never add to a mod's index.
    pub fn with_reference(mut self, reference: &'a DiscoveredContainers) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn build_index(
        &self,
        candidate: &ModCandidate,
        mod_dir: &Utf8Path,
        log: &mut DiagnosticLog,
    ) -> ModIndex {
        let scope = candidate.real_name.as_str();
        let containers = discover(mod_dir, scope, log);

        let mut index = if containers.is_empty() {
            ModIndex::default()
        } else {
            self.index_containers(&containers, scope, log)
        };

        if index.is_empty() {
            let loose = scan_loose_files(mod_dir);
            if loose.is_empty() {
                log.info(scope, "No container entries and no loose packages");
            } else {
                log.info(
                    scope,
                    format!("No container entries; using {} loose packages", loose.len()),
                );
                let mounted = index.containers_mounted;
                let stats = index.stats;
                let project = self.config.project_name.as_deref();
                index = ModIndex::from_paths(
                    loose.iter().filter_map(|rel| normalize_asset_path(rel, project)),
                    IndexSource::LooseFiles,
                );
                index.containers_mounted = mounted;
                index.stats = stats;
            }
        }

        log.info(scope, format!("Collected {} assets", index.len()));
        index
    }

    fn index_containers(
        &self,
        containers: &DiscoveredContainers,
        scope: &str,
        log: &mut DiagnosticLog,
    ) -> ModIndex {
        let allowed = containers.allowed_containers();
        let mut session = MountSession::new(
            self.adapter,
            self.config.engine_version,
            self.config.aes_key.as_ref(),
        );

        if let Some(reference) = self.reference.filter(|r| !r.is_empty()) {
            let mounted = session.mount_all(reference, MountRole::Reference, scope, log);
            log.debug(
                scope,
                format!("Mounted {} of {} reference containers", mounted, reference.len()),
            );
        }

        let mounted = session.mount_all(containers, MountRole::Mod, scope, log);
        log.info(
            scope,
            format!(
                "Mounted {} of {} containers, {} entries in session",
                mounted,
                containers.len(),
                session.file_count()
            ),
        );

        let (kept, stats) = attribute_entries(session.files(), &allowed);
        let mut index = ModIndex {
            source: IndexSource::Containers,
            stats,
            containers_mounted: mounted,
            ..ModIndex::default()
        };
        let project = self.config.project_name.as_deref();
        for raw in kept {
            if let Some(path) = normalize_asset_path(raw, project) {
                index.insert(path);
            }
        }

        log.info(
            scope,
            format!(
                "Attribution: {} packages, {} kept, {} foreign, {} ambiguous",
                stats.packages, stats.kept, stats.foreign, stats.ambiguous
            ),
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, backing: Option<&str>) -> MountedFile {
        MountedFile {
            path: path.to_string(),
            backing: backing.map(str::to_string),
            role: MountRole::Mod,
        }
    }

    #[test]
    fn test_attribution_discards_foreign_and_ambiguous() {
        let files = [
            file("Hero/Content/A.uasset", Some("Hero_P.pak")),
            file("Hero/Content/B.uasset", Some("pakchunk0-Windows.pak")),
            file("Hero/Content/C.uasset", None),
            file("Hero/Content/A.uexp", Some("Hero_P.pak")),
            file("Hero/Content/D.umap", Some("HERO_P.PAK")),
        ];
        let allowed: AllowedContainers = ["Hero_P.pak"].into_iter().collect();

        let (kept, stats) = attribute_entries(&files, &allowed);
        assert_eq!(kept, ["Hero/Content/A.uasset", "Hero/Content/D.umap"]);
        assert_eq!(
            stats,
            AttributionStats {
                entries: 5,
                packages: 4,
                kept: 2,
                foreign: 1,
                ambiguous: 1,
            }
        );
    }

    #[test]
    fn test_empty_allow_list_keeps_all_packages() {
        let files = [
            file("A.uasset", None),
            file("B.uasset", Some("Other.pak")),
        ];
        let (kept, stats) = attribute_entries(&files, &AllowedContainers::default());
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.ambiguous, 0);
    }

    #[test]
    fn test_mod_index_dedups_case_insensitively() {
        let index = ModIndex::from_paths(
            ["/Game/Char/Hero", "/game/char/HERO", "/Game/Char/Cape"],
            IndexSource::Containers,
        );
        assert_eq!(index.len(), 2);
        assert!(index.contains("/GAME/CHAR/HERO"));
        let paths: Vec<_> = index.paths().collect();
        assert_eq!(paths, ["/Game/Char/Cape", "/Game/Char/Hero"]);
    }

    #[test]
    fn test_loose_scan_lists_relative_packages() {
        let tmp = tempfile::tempdir().unwrap();
        let root = camino::Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        std::fs::create_dir_all(root.join("Content/Char")).unwrap();
        std::fs::write(root.join("Content/Char/Hero.uasset"), b"").unwrap();
        std::fs::write(root.join("Content/Char/Hero.uexp"), b"").unwrap();
        std::fs::write(root.join("Arena.UMAP"), b"").unwrap();

        let mut loose = scan_loose_files(&root);
        loose.sort();
        assert_eq!(loose, ["Arena.UMAP", "Content/Char/Hero.uasset"]);
    }
}
