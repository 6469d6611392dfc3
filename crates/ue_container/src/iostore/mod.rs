//! IoStore containers (`.utoc` table of contents with a `.ucas` payload).
//!
//! Only the TOC is read; file names come from its directory index.

mod directory;
mod header;

pub(crate) use directory::DirectoryIndex;
pub use header::{ContainerFlags, TocHeader, TocVersion};

use crate::crypto::AesKey;
use crate::container::{Container, ContainerKind};
use crate::error::{ContainerError, Result};
use crate::io_ext::read_block;
use crate::version::EngineVersion;
use binrw::BinRead;
use byteorder::{ReadBytesExt, LE};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

// Chunk id (12 bytes) and packed 5+5 byte offset/length per TOC entry.
const CHUNK_ID_SIZE: u64 = 12;
const OFFSET_AND_LENGTH_SIZE: u64 = 10;
const BLOCK_HASH_SIZE: u64 = 20;

#[derive(Debug)]
enum DirectoryState {
    Absent,
    Encrypted(Vec<u8>),
    Loaded(Vec<String>),
}

/// An opened `.utoc`.
#[derive(Debug)]
pub struct IoStoreReader {
    name: Option<String>,
    cas_path: Option<Utf8PathBuf>,
    header: TocHeader,
    version: TocVersion,
    directory: DirectoryState,
}

impl IoStoreReader {
    /// Open a TOC on its own. The payload is not checked and no version gate applies.
    pub fn open(utoc: &Utf8Path) -> Result<Self> {
        let reader = BufReader::new(File::open(utoc)?);
        let mut toc = Self::from_reader(reader, None)?;
        toc.name = utoc.file_name().map(str::to_string);
        Ok(toc)
    }

    /// Open a TOC together with its `.ucas`, rejecting TOCs newer than `engine`
    /// writes.
    pub fn open_paired(utoc: &Utf8Path, ucas: &Utf8Path, engine: EngineVersion) -> Result<Self> {
        if !ucas.is_file() {
            return Err(ContainerError::MissingPayload(ucas.to_path_buf()));
        }
        let reader = BufReader::new(File::open(utoc)?);
        let mut toc = Self::from_reader(reader, Some(engine))?;
        toc.name = utoc.file_name().map(str::to_string);
        toc.cas_path = Some(ucas.to_path_buf());
        Ok(toc)
    }

    pub fn from_reader<R: Read + Seek>(
        mut reader: R,
        engine: Option<EngineVersion>,
    ) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        if file_len < TocHeader::SIZE {
            return Err(ContainerError::TooSmall(file_len));
        }
        reader.seek(SeekFrom::Start(0))?;
        let header = TocHeader::read(&mut reader)?;

        let version = TocVersion::from_u8(header.version)
            .ok_or(ContainerError::UnsupportedTocVersion(header.version))?;
        if let Some(engine) = engine {
            if header.version > engine.max_toc_version() {
                return Err(ContainerError::TocVersionTooNew {
                    found: header.version,
                    engine,
                });
            }
        }
        if header.header_size as u64 != TocHeader::SIZE {
            return Err(ContainerError::malformed(
                "IoStore header",
                format!("unexpected header size {}", header.header_size),
            ));
        }

        let offset = Self::directory_index_offset(&mut reader, &header, version)?;
        let indexed = version >= TocVersion::DirectoryIndex
            && header.has_flag(ContainerFlags::INDEXED)
            && header.directory_index_size > 0;

        let directory = if indexed {
            let bytes = read_block(
                &mut reader,
                offset,
                header.directory_index_size as u64,
                file_len,
                "IoStore directory index",
            )?;
            if header.has_flag(ContainerFlags::ENCRYPTED) {
                DirectoryState::Encrypted(bytes)
            } else {
                let index = DirectoryIndex::parse(&bytes)?;
                DirectoryState::Loaded(index.file_paths(header.entry_count)?)
            }
        } else {
            DirectoryState::Absent
        };

        Ok(Self {
            name: None,
            cas_path: None,
            header,
            version,
            directory,
        })
    }

    // Sections in TOC order: chunk ids, offsets, hash seeds, overflow chunks,
    // compression blocks, method names, signatures, then the directory index.
    fn directory_index_offset<R: Read + Seek>(
        reader: &mut R,
        header: &TocHeader,
        version: TocVersion,
    ) -> Result<u64> {
        let entries = header.entry_count as u64;
        let blocks = header.compressed_block_entry_count as u64;

        let mut offset = TocHeader::SIZE + entries * (CHUNK_ID_SIZE + OFFSET_AND_LENGTH_SIZE);
        if version >= TocVersion::PerfectHashWithOverflow {
            offset += (header.perfect_hash_seeds_count as u64
                + header.chunks_without_perfect_hash_count as u64)
                * 4;
        } else if version >= TocVersion::PerfectHash {
            offset += header.perfect_hash_seeds_count as u64 * 4;
        }
        offset += blocks * header.compressed_block_entry_size as u64;
        offset += header.compression_method_name_count as u64
            * header.compression_method_name_length as u64;

        if header.has_flag(ContainerFlags::SIGNED) {
            reader.seek(SeekFrom::Start(offset))?;
            let hash_size = reader.read_i32::<LE>()?;
            if hash_size < 0 {
                return Err(ContainerError::malformed(
                    "IoStore signature",
                    format!("negative hash size {}", hash_size),
                ));
            }
            offset += 4 + 2 * hash_size as u64 + blocks * BLOCK_HASH_SIZE;
        }
        Ok(offset)
    }

    pub fn header(&self) -> &TocHeader {
        &self.header
    }

    pub fn toc_version(&self) -> TocVersion {
        self.version
    }

    /// The `.ucas` this TOC was opened with, if any.
    pub fn cas_path(&self) -> Option<&Utf8Path> {
        self.cas_path.as_deref()
    }
}

impl Container for IoStoreReader {
    fn kind(&self) -> ContainerKind {
        ContainerKind::IoStore
    }

    fn backing_file(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn needs_key(&self) -> bool {
        matches!(self.directory, DirectoryState::Encrypted(_))
    }

    fn submit_key(&mut self, key: &AesKey) -> Result<()> {
        let DirectoryState::Encrypted(encrypted) = &self.directory else {
            return Ok(());
        };
        let mut bytes = encrypted.clone();
        key.decrypt_in_place(&mut bytes)?;
        let paths = DirectoryIndex::parse(&bytes)
            .and_then(|index| {
                if index.mount_point.chars().any(char::is_control) {
                    return Err(ContainerError::KeyRejected);
                }
                index.file_paths(self.header.entry_count)
            })
            .map_err(|_| ContainerError::KeyRejected)?;
        self.directory = DirectoryState::Loaded(paths);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        match &self.directory {
            DirectoryState::Absent => Ok(Vec::new()),
            DirectoryState::Encrypted(_) => Err(ContainerError::KeyRequired),
            DirectoryState::Loaded(paths) => Ok(paths.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::IoStoreFixture;
    use std::io::Cursor;

    fn sample(version: u8) -> IoStoreFixture {
        IoStoreFixture::new(version, "../../../")
            .file("Hero/Content/Char/Hero.uasset")
            .file("Hero/Content/Char/Hero.uexp")
            .file("Hero/Content/Maps/Arena.umap")
    }

    fn open(fixture: &IoStoreFixture, engine: Option<EngineVersion>) -> Result<IoStoreReader> {
        IoStoreReader::from_reader(Cursor::new(fixture.to_bytes()), engine)
    }

    #[test]
    fn test_lists_files_for_indexed_versions() {
        for version in 2..=8u8 {
            let toc = open(&sample(version), None).unwrap();
            let mut files = toc.list_files().unwrap();
            files.sort();
            assert_eq!(files.len(), 3, "toc version {}", version);
            assert_eq!(files[0], "../../../Hero/Content/Char/Hero.uasset");
        }
    }

    #[test]
    fn test_signed_toc_skips_signatures() {
        let toc = open(&sample(5).signed(), None).unwrap();
        assert_eq!(toc.list_files().unwrap().len(), 3);
    }

    #[test]
    fn test_initial_version_has_no_directory() {
        let toc = open(&sample(1), None).unwrap();
        assert!(toc.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_engine_gate_rejects_newer_toc() {
        let err = open(&sample(5), Some(EngineVersion::Ue4_27)).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::TocVersionTooNew { found: 5, engine: EngineVersion::Ue4_27 }
        ));
        assert!(open(&sample(3), Some(EngineVersion::Ue4_27)).is_ok());
    }

    #[test]
    fn test_unknown_version_is_unsupported() {
        let err = open(&sample(42), None).unwrap_err();
        assert!(matches!(err, ContainerError::UnsupportedTocVersion(42)));
    }

    #[test]
    fn test_encrypted_directory_needs_key() {
        let key = AesKey::from_bytes([9; 32]);
        let mut toc = open(&sample(5).encrypted(key.clone()), None).unwrap();
        assert!(toc.needs_key());
        assert!(matches!(toc.list_files(), Err(ContainerError::KeyRequired)));

        assert!(matches!(
            toc.submit_key(&AesKey::from_bytes([1; 32])),
            Err(ContainerError::KeyRejected)
        ));
        toc.submit_key(&key).unwrap();
        assert_eq!(toc.list_files().unwrap().len(), 3);
    }

    #[test]
    fn test_truncated_toc_is_too_small() {
        let err = IoStoreReader::from_reader(Cursor::new(vec![0u8; 20]), None).unwrap_err();
        assert!(matches!(err, ContainerError::TooSmall(20)));
    }

    #[test]
    fn test_open_paired_requires_payload() {
        let dir = tempfile::tempdir().unwrap();
        let utoc = Utf8PathBuf::from_path_buf(dir.path().join("Hero_P.utoc")).unwrap();
        sample(3).write_to(&utoc).unwrap();
        let ucas = utoc.with_extension("ucas");

        let err = IoStoreReader::open_paired(&utoc, &ucas, EngineVersion::Ue4_27).unwrap_err();
        assert!(matches!(err, ContainerError::MissingPayload(_)));

        std::fs::write(&ucas, b"").unwrap();
        let toc = IoStoreReader::open_paired(&utoc, &ucas, EngineVersion::Ue4_27).unwrap();
        assert_eq!(toc.backing_file(), Some("Hero_P.utoc"));
        assert_eq!(toc.cas_path(), Some(ucas.as_path()));

        let toc_only = IoStoreReader::open(&utoc).unwrap();
        assert_eq!(toc_only.cas_path(), None);
        assert_eq!(toc_only.list_files().unwrap().len(), 3);
    }
}
