//! Readers for Unreal Engine packaged content containers.
//!
//! Two container families are supported:
//!
//! - `.pak` archives, read with [`repak`] ([`pak`])
//! - IoStore containers, a `.utoc` table of contents paired with a `.ucas`
//!   payload ([`iostore`])
//!
//! Both only need their index read to enumerate file paths, which is all this
//! crate does. A pak takes its AES-256 key when it is opened; an IoStore TOC
//! with an encrypted directory index takes it through [`Container::submit_key`].
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use ue_container::{Container, EngineVersion, PakArchive};
//!
//! let engine = EngineVersion::Ue5_1;
//! let pak = PakArchive::open(Utf8Path::new("Hero_P.pak"), engine.pak_version(), None)?;
//! for path in pak.list_files()? {
//!     println!("{}", path);
//! }
//! # Ok::<(), ue_container::ContainerError>(())
//! ```

pub mod crypto;
pub mod container;
pub mod error;
pub mod io_ext;
pub mod iostore;
pub mod pak;
pub mod version;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use crypto::AesKey;
pub use container::{Container, ContainerKind};
pub use error::{ContainerError, Result};
pub use iostore::{IoStoreReader, TocHeader, TocVersion};
pub use pak::{PakArchive, PakVersion};
pub use version::EngineVersion;
