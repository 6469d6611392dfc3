//! Scoped mount session.
//!
//! A [`MountSession`] mounts containers in order and merges their listings into
//! one file table keyed by case-insensitive path. Later mounts replace earlier
//! ones, so a mod container mounted after the base game owns the paths it
//! overrides. Every file remembers the name of the container that backs it,
//! which is what attribution filters on.
//!
//! Containers stay open until the session is dropped, which releases every file
//! handle at once on all exit paths.

use crate::adapter::{ArchiveAdapter, MountFailure, MountedContainer};
use crate::diagnostics::DiagnosticLog;
use crate::discovery::DiscoveredContainers;
use camino::Utf8Path;
use std::collections::BTreeMap;
use ue_container::{AesKey, EngineVersion};

/// Why a container was mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountRole {
    /// Base game context; never contributes to a mod's assets.
    Reference,
    /// One of the mod's own containers.
    Mod,
}

/// One entry in the merged file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedFile {
    /// Path as listed by the container, mount point included.
    pub path: String,
    /// File name of the backing container, when the reader could tell.
    pub backing: Option<String>,
    pub role: MountRole,
}

pub struct MountSession<'a> {
    adapter: &'a ArchiveAdapter,
    engine: EngineVersion,
    key: Option<&'a AesKey>,
    containers: Vec<MountedContainer>,
    files: BTreeMap<String, MountedFile>,
    failures: Vec<MountFailure>,
}

impl<'a> MountSession<'a> {
    pub fn new(
        adapter: &'a ArchiveAdapter,
        engine: EngineVersion,
        key: Option<&'a AesKey>,
    ) -> Self {
        Self {
            adapter,
            engine,
            key,
            containers: Vec::new(),
            files: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    /// Mount one container and merge its listing. Returns `false` if no strategy
    /// could open it; the failure is logged and kept.
    pub fn mount(
        &mut self,
        path: &Utf8Path,
        cas_path: Option<&Utf8Path>,
        role: MountRole,
        scope: &str,
        log: &mut DiagnosticLog,
    ) -> bool {
        let mounted = match self
            .adapter
            .try_mount(path, cas_path, self.engine, self.key, scope, log)
        {
            Ok(mounted) => mounted,
            Err(failure) => {
                log.warn(scope, format!("Skipping container: {}", failure));
                for attempt in &failure.attempts {
                    log.debug(scope, format!("  {}", attempt));
                }
                self.failures.push(failure);
                return false;
            }
        };

        let name = path.file_name().unwrap_or(path.as_str());
        match mounted.list_files() {
            Ok(paths) => {
                log.debug(
                    scope,
                    format!("{}: {} entries ({:?})", name, paths.len(), role),
                );
                let backing = mounted.backing_file().map(str::to_string);
                for path in paths {
                    self.files.insert(
                        path.to_lowercase(),
                        MountedFile {
                            path,
                            backing: backing.clone(),
                            role,
                        },
                    );
                }
            }
            Err(e) => log.warn(scope, format!("{}: cannot list entries: {}", name, e)),
        }
        self.containers.push(mounted);
        true
    }

    /// Mount every discovered container, `.pak`s first. Returns how many mounted.
    pub fn mount_all(
        &mut self,
        containers: &DiscoveredContainers,
        role: MountRole,
        scope: &str,
        log: &mut DiagnosticLog,
    ) -> usize {
        let mut mounted = 0;
        for pak in &containers.paks {
            if self.mount(pak, None, role, scope, log) {
                mounted += 1;
            }
        }
        for pair in &containers.iostores {
            if self.mount(&pair.utoc, pair.ucas.as_deref(), role, scope, log) {
                mounted += 1;
            }
        }
        mounted
    }

    /// Merged file table, ordered by case-insensitive path.
    pub fn files(&self) -> impl Iterator<Item = &MountedFile> {
        self.files.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn mounted(&self) -> &[MountedContainer] {
        &self.containers
    }

    pub fn failures(&self) -> &[MountFailure] {
        &self.failures
    }
}

impl Drop for MountSession<'_> {
    fn drop(&mut self) {
        tracing::trace!(
            "Releasing mount session: {} containers, {} files",
            self.containers.len(),
            self.files.len()
        );
    }
}
