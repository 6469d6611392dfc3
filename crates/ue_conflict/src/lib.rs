//! Asset-level conflict detection for Unreal Engine mods.
//!
//! Given a set of mods, each a directory of `.pak` and/or `.utoc`/`.ucas`
//! containers (or loose `.uasset` files), this crate works out which engine
//! asset paths are provided by more than one mod at once.
//!
//! - **Best effort**: a container that no mount strategy can open, or a mod
//!   directory that is missing, never aborts the scan; it is logged and skipped.
//! - **Attribution**: each entry is traced to the container that backs it, so
//!   base game containers mounted for context never leak into a mod's index.
//! - **Real-name accounting**: conflicts are counted per mod directory name;
//!   display names are cosmetic.
//! - **Diagnostics**: every discovery, mount and attribution decision lands in
//!   the result's diagnostic log as well as in `tracing`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use camino::Utf8Path;
//! use ue_conflict::{enumerate_candidates, ConflictDetector, EngineVersion, ScanConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mods_root = Utf8Path::new("C:/Games/Example/Content/Paks/~mods");
//! let mods = enumerate_candidates(mods_root, None)?;
//!
//! let detector = ConflictDetector::new(ScanConfig::new(EngineVersion::Ue5_1));
//! let result = detector.detect_conflicts(mods_root, None, &mods, true, &AtomicBool::new(false))?;
//!
//! for conflict in &result.conflicts {
//!     println!("{}: {}", conflict.asset_path, conflict.providing_mods.join(", "));
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod candidates;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod discovery;
pub mod display_name;
pub mod error;
pub mod index;
pub mod model;
pub mod paths;
pub mod report;
pub mod resolver;
pub mod session;

pub use adapter::{ArchiveAdapter, MountFailure, MountStrategy, MountedContainer};
pub use candidates::enumerate_candidates;
pub use config::{AppConfig, EngineVersionResolver, ScanConfig};
pub use detector::{ConflictDetector, ScanOptions, ScanProgress, ScanStage};
pub use diagnostics::{DiagnosticEntry, DiagnosticLevel, DiagnosticLog};
pub use discovery::{discover, DiscoveredContainers};
pub use display_name::resolve_display_name;
pub use error::{Error, Result};
pub use index::{AssetIndexBuilder, ModIndex};
pub use model::{ConflictEntry, ModCandidate, ModConflictResult, ModConflictSummary, ModStatus};
pub use report::ConflictReport;
pub use resolver::ConflictResolver;
pub use session::MountSession;
pub use ue_container::{AesKey, EngineVersion};
