//! `.pak` archives, read through [`repak`].
//!
//! repak parses the footer and index, including encrypted indexes. This module
//! adapts its reader to [`Container`] and remembers which file it came from.

use crate::container::{Container, ContainerKind};
use crate::crypto::AesKey;
use crate::error::Result;
use camino::Utf8Path;
use repak::PakBuilder;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};

pub use repak::Version as PakVersion;

/// An opened `.pak` whose index has been read.
///
/// repak needs the key while it reads the index, so it is taken when the
/// archive is opened and [`Container::submit_key`] has nothing left to do.
pub struct PakArchive {
    pak: repak::PakReader,
    name: Option<String>,
}

impl PakArchive {
    /// Open a file assuming exactly one footer layout.
    pub fn open(path: &Utf8Path, version: PakVersion, key: Option<&AesKey>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let pak = builder(key).reader_with_version(&mut reader, version)?;
        Ok(Self {
            pak,
            name: path.file_name().map(str::to_string),
        })
    }

    /// Read from an open handle, letting repak try every footer layout.
    pub fn detect<R: Read + Seek>(reader: &mut R, key: Option<&AesKey>) -> Result<Self> {
        let pak = builder(key).reader(reader)?;
        Ok(Self { pak, name: None })
    }

    /// Record the on-disk file name for an archive read from a handle.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(&self) -> PakVersion {
        self.pak.version()
    }

    pub fn mount_point(&self) -> &str {
        self.pak.mount_point()
    }

    pub fn is_index_encrypted(&self) -> bool {
        self.pak.encrypted_index()
    }
}

fn builder(key: Option<&AesKey>) -> PakBuilder {
    match key {
        Some(key) => PakBuilder::new().key(key.cipher()),
        None => PakBuilder::new(),
    }
}

fn join_mount_point(mount_point: &str, file: &str) -> String {
    let file = file.trim_start_matches('/');
    if mount_point.is_empty() || mount_point.ends_with('/') {
        format!("{}{}", mount_point, file)
    } else {
        format!("{}/{}", mount_point, file)
    }
}

impl Container for PakArchive {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Pak
    }

    fn backing_file(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn needs_key(&self) -> bool {
        false
    }

    fn submit_key(&mut self, _key: &AesKey) -> Result<()> {
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mount_point = self.pak.mount_point();
        Ok(self
            .pak
            .files()
            .iter()
            .map(|file| join_mount_point(mount_point, file))
            .collect())
    }
}

impl fmt::Debug for PakArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PakArchive")
            .field("name", &self.name)
            .field("version", &self.pak.version())
            .field("mount_point", &self.pak.mount_point())
            .finish()
    }
}
