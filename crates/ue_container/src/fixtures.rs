//! Writers for small but structurally valid containers.
//!
//! Paks are written with repak's writer. IoStore TOCs are assembled here and
//! carry no payload; only the header, the chunk tables and the directory index
//! are written, which is everything [`IoStoreReader`](crate::IoStoreReader)
//! looks at.

use crate::crypto::AesKey;
use crate::error::Result;
use crate::iostore::{ContainerFlags, DirectoryIndex, TocHeader};
use crate::pak::PakVersion;
use binrw::BinWrite;
use repak::PakBuilder;
use std::io::Cursor;
use std::path::Path;

/// Builder for a `.pak` file.
#[derive(Debug, Clone)]
pub struct PakFixture {
    version: PakVersion,
    mount_point: String,
    files: Vec<String>,
}

impl PakFixture {
    pub fn new(version: PakVersion, mount_point: impl Into<String>) -> Self {
        Self {
            version,
            mount_point: mount_point.into(),
            files: Vec::new(),
        }
    }

    /// Add a file path relative to the mount point.
    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Each entry's payload is its own path.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PakBuilder::new().writer(
            Cursor::new(Vec::new()),
            self.version,
            self.mount_point.clone(),
            Some(0),
        );
        for file in &self.files {
            writer.write_file(file, false, file.as_bytes())?;
        }
        Ok(writer.write_index()?.into_inner())
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Builder for a `.utoc` file.
#[derive(Debug, Clone)]
pub struct IoStoreFixture {
    version: u8,
    mount_point: String,
    files: Vec<String>,
    key: Option<AesKey>,
    signed: bool,
}

impl IoStoreFixture {
    pub fn new(version: u8, mount_point: impl Into<String>) -> Self {
        Self {
            version,
            mount_point: mount_point.into(),
            files: Vec::new(),
            key: None,
            signed: false,
        }
    }

    /// Add a file path relative to the mount point.
    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn encrypted(mut self, key: AesKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut directory = DirectoryIndex::from_paths(&self.mount_point, &self.files).to_bytes();
        let mut flags = ContainerFlags::INDEXED;
        if let Some(key) = &self.key {
            key.encrypt_padded(&mut directory);
            flags |= ContainerFlags::ENCRYPTED;
        }
        if self.signed {
            flags |= ContainerFlags::SIGNED;
        }

        let entry_count = self.files.len() as u32;
        let header = TocHeader {
            version: self.version,
            header_size: TocHeader::SIZE as u32,
            entry_count,
            compressed_block_entry_count: 0,
            compressed_block_entry_size: 12,
            compression_method_name_count: 0,
            compression_method_name_length: 32,
            compression_block_size: 0x10000,
            directory_index_size: directory.len() as u32,
            partition_count: 1,
            container_flags: flags,
            partition_size: u64::MAX,
            ..TocHeader::default()
        };

        let mut cursor = Cursor::new(Vec::new());
        // Writing into a Vec cannot fail
        let _ = header.write(&mut cursor);
        let mut out = cursor.into_inner();

        for chunk in 0..entry_count {
            let mut id = [0u8; 12];
            id[..4].copy_from_slice(&chunk.to_le_bytes());
            id[11] = 1; // export bundle data
            out.extend_from_slice(&id);
        }
        out.resize(out.len() + entry_count as usize * 10, 0);
        if self.signed {
            out.extend_from_slice(&20i32.to_le_bytes());
            out.extend_from_slice(&[0xEE; 40]);
        }
        out.extend_from_slice(&directory);
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}
