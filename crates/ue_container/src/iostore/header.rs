use binrw::binrw;

/// Fixed 144-byte header at the start of every `.utoc`.
#[binrw]
#[brw(little, magic = b"-==--==--==--==-")]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TocHeader {
    pub version: u8,
    pub reserved0: u8,
    pub reserved1: u16,
    pub header_size: u32,
    pub entry_count: u32,
    pub compressed_block_entry_count: u32,
    pub compressed_block_entry_size: u32,
    pub compression_method_name_count: u32,
    pub compression_method_name_length: u32,
    pub compression_block_size: u32,
    pub directory_index_size: u32,
    pub partition_count: u32,
    pub container_id: u64,
    pub encryption_key_guid: [u8; 16],
    pub container_flags: u8,
    pub reserved3: u8,
    pub reserved4: u16,
    pub perfect_hash_seeds_count: u32,
    pub partition_size: u64,
    pub chunks_without_perfect_hash_count: u32,
    pub reserved7: u32,
    pub reserved8: [u64; 5],
}

impl TocHeader {
    pub const SIZE: u64 = 144;

    pub fn has_flag(&self, flag: u8) -> bool {
        self.container_flags & flag != 0
    }
}

/// Bits of [`TocHeader::container_flags`].
pub struct ContainerFlags;

impl ContainerFlags {
    pub const COMPRESSED: u8 = 1 << 0;
    pub const ENCRYPTED: u8 = 1 << 1;
    pub const SIGNED: u8 = 1 << 2;
    pub const INDEXED: u8 = 1 << 3;
}

/// TOC format revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TocVersion {
    Initial = 1,
    DirectoryIndex = 2,
    PartitionSize = 3,
    PerfectHash = 4,
    PerfectHashWithOverflow = 5,
    OnDemandMetaData = 6,
    RemovedOnDemandMetaData = 7,
    ReplaceIoChunkHashWithIoHash = 8,
}

impl TocVersion {
    pub const LATEST: TocVersion = TocVersion::ReplaceIoChunkHashWithIoHash;

    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => TocVersion::Initial,
            2 => TocVersion::DirectoryIndex,
            3 => TocVersion::PartitionSize,
            4 => TocVersion::PerfectHash,
            5 => TocVersion::PerfectHashWithOverflow,
            6 => TocVersion::OnDemandMetaData,
            7 => TocVersion::RemovedOnDemandMetaData,
            8 => TocVersion::ReplaceIoChunkHashWithIoHash,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;

    #[test]
    fn test_header_is_144_bytes() {
        let mut out = Cursor::new(Vec::new());
        TocHeader::default().write(&mut out).unwrap();
        assert_eq!(out.into_inner().len() as u64, TocHeader::SIZE);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let bytes = vec![0u8; 144];
        assert!(TocHeader::read(&mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_version_lookup() {
        assert_eq!(TocVersion::from_u8(3), Some(TocVersion::PartitionSize));
        assert_eq!(TocVersion::from_u8(0), None);
        assert_eq!(TocVersion::from_u8(9), None);
        assert!(TocVersion::PerfectHash < TocVersion::PerfectHashWithOverflow);
    }
}
