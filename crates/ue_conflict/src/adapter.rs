//! Capability-probing container adapter.
//!
//! A container can be opened several ways and which one works depends on the
//! file: the footer layout the engine version implies, a footer from some other
//! engine release, a TOC with or without its payload. [`ArchiveAdapter`] holds an
//! ordered list of [`MountStrategy`] implementations and takes the first one that
//! opens the file. Each attempt is isolated: an error or a panic in one strategy
//! is recorded and the next strategy is tried.
//!
//! Default order:
//!
//! 1. [`PakPathVersioned`]: `.pak` by path, repak's `reader_with_version` for the
//!    engine's layout
//! 2. [`PakHandleProbe`]: `.pak` from an open handle, repak's `reader` trying
//!    every layout
//! 3. [`IoStorePaired`]: `.utoc` + `.ucas`, gated on the engine's TOC version
//! 4. [`IoStoreTocOnly`]: `.utoc` alone
//!
//! Pak strategies hand the key to repak as they open. Once a container is open
//! the key is also submitted to it, which unlocks encrypted IoStore indexes.

use crate::diagnostics::DiagnosticLog;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use ue_container::{AesKey, Container, ContainerKind, EngineVersion, IoStoreReader, PakArchive};

/// Everything a strategy needs to open one container.
#[derive(Debug, Clone, Copy)]
pub struct MountRequest<'a> {
    pub path: &'a Utf8Path,
    pub kind: ContainerKind,
    /// Resolved `.ucas` for a `.utoc`, if any.
    pub cas_path: Option<&'a Utf8Path>,
    pub engine: EngineVersion,
    pub key: Option<&'a AesKey>,
}

/// One way of opening a container.
pub trait MountStrategy: Send + Sync {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this strategy applies to `kind` at all. Inapplicable strategies
    /// are skipped without being recorded as attempts.
    fn handles(&self, kind: ContainerKind) -> bool;

    fn open(&self, request: &MountRequest<'_>) -> ue_container::Result<Box<dyn Container>>;
}

pub struct PakPathVersioned;

impl MountStrategy for PakPathVersioned {
    fn name(&self) -> &'static str {
        "pak-path-versioned"
    }

    fn handles(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Pak
    }

    fn open(&self, request: &MountRequest<'_>) -> ue_container::Result<Box<dyn Container>> {
        let pak = PakArchive::open(request.path, request.engine.pak_version(), request.key)?;
        Ok(Box::new(pak))
    }
}

pub struct PakHandleProbe;

impl MountStrategy for PakHandleProbe {
    fn name(&self) -> &'static str {
        "pak-handle-probe"
    }

    fn handles(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Pak
    }

    fn open(&self, request: &MountRequest<'_>) -> ue_container::Result<Box<dyn Container>> {
        let mut reader = BufReader::new(File::open(request.path)?);
        let pak = PakArchive::detect(&mut reader, request.key)?;
        Ok(match request.path.file_name() {
            Some(name) => Box::new(pak.named(name)),
            None => Box::new(pak),
        })
    }
}

pub struct IoStorePaired;

impl MountStrategy for IoStorePaired {
    fn name(&self) -> &'static str {
        "iostore-paired"
    }

    fn handles(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::IoStore
    }

    fn open(&self, request: &MountRequest<'_>) -> ue_container::Result<Box<dyn Container>> {
        let expected;
        let ucas = match request.cas_path {
            Some(ucas) => ucas,
            None => {
                expected = request.path.with_extension("ucas");
                expected.as_path()
            }
        };
        let toc = IoStoreReader::open_paired(request.path, ucas, request.engine)?;
        Ok(Box::new(toc))
    }
}

pub struct IoStoreTocOnly;

impl MountStrategy for IoStoreTocOnly {
    fn name(&self) -> &'static str {
        "iostore-toc-only"
    }

    fn handles(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::IoStore
    }

    fn open(&self, request: &MountRequest<'_>) -> ue_container::Result<Box<dyn Container>> {
        Ok(Box::new(IoStoreReader::open(request.path)?))
    }
}

/// Result of one strategy that did not produce a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    pub error: String,
}

impl fmt::Display for StrategyAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// No strategy could open a container.
#[derive(Error, Debug, Clone)]
#[error("no strategy could mount {path} ({} attempted)", .attempts.len())]
pub struct MountFailure {
    pub path: Utf8PathBuf,
    pub attempts: Vec<StrategyAttempt>,
}

/// A container opened by one of the strategies. Dropping it closes the file.
pub struct MountedContainer {
    container: Box<dyn Container>,
    path: Utf8PathBuf,
    strategy: &'static str,
}

impl MountedContainer {
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Name of the strategy that opened the container.
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn kind(&self) -> ContainerKind {
        self.container.kind()
    }

    /// File name of the container as reported by the reader.
    pub fn backing_file(&self) -> Option<&str> {
        self.container.backing_file()
    }

    pub fn needs_key(&self) -> bool {
        self.container.needs_key()
    }

    pub fn list_files(&self) -> ue_container::Result<Vec<String>> {
        self.container.list_files()
    }
}

impl fmt::Debug for MountedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedContainer")
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .field("backing_file", &self.backing_file())
            .finish()
    }
}

/// Ordered strategy chain.
pub struct ArchiveAdapter {
    strategies: Vec<Box<dyn MountStrategy>>,
}

impl Default for ArchiveAdapter {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PakPathVersioned),
            Box::new(PakHandleProbe),
            Box::new(IoStorePaired),
            Box::new(IoStoreTocOnly),
        ])
    }
}

impl ArchiveAdapter {
    pub fn new(strategies: Vec<Box<dyn MountStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Open `path` with the first strategy that succeeds, then submit `key`.
    ///
    /// Key submission failures are logged and otherwise ignored: the container
    /// may not be encrypted, or only some of its contents may be.
    pub fn try_mount(
        &self,
        path: &Utf8Path,
        cas_path: Option<&Utf8Path>,
        engine: EngineVersion,
        key: Option<&AesKey>,
        scope: &str,
        log: &mut DiagnosticLog,
    ) -> Result<MountedContainer, MountFailure> {
        let name = path.file_name().unwrap_or(path.as_str());
        let Some(kind) = ContainerKind::from_path(path) else {
            log.warn(scope, format!("{}: not a .pak or .utoc", name));
            return Err(MountFailure {
                path: path.to_path_buf(),
                attempts: Vec::new(),
            });
        };

        let request = MountRequest {
            path,
            kind,
            cas_path,
            engine,
            key,
        };

        let mut attempts = Vec::new();
        let mut opened = None;
        for strategy in self.strategies.iter().filter(|s| s.handles(kind)) {
            log.trace(scope, format!("{}: trying {}", name, strategy.name()));
            match panic::catch_unwind(AssertUnwindSafe(|| strategy.open(&request))) {
                Ok(Ok(container)) => {
                    opened = Some((container, strategy.name()));
                    break;
                }
                Ok(Err(e)) => {
                    log.debug(scope, format!("{}: {} failed: {}", name, strategy.name(), e));
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        error: e.to_string(),
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log.warn(
                        scope,
                        format!("{}: {} panicked: {}", name, strategy.name(), message),
                    );
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        error: format!("panicked: {}", message),
                    });
                }
            }
        }

        let Some((mut container, strategy)) = opened else {
            return Err(MountFailure {
                path: path.to_path_buf(),
                attempts,
            });
        };
        log.debug(scope, format!("{}: mounted via {}", name, strategy));

        if let Some(key) = key {
            let was_locked = container.needs_key();
            match container.submit_key(key) {
                Ok(()) if was_locked => log.debug(scope, format!("{}: AES key accepted", name)),
                Ok(()) => {}
                Err(e) => log.warn(
                    scope,
                    format!("{}: AES key submission failed, continuing: {}", name, e),
                ),
            }
        }

        Ok(MountedContainer {
            container,
            path: path.to_path_buf(),
            strategy,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
