//! Reader helpers for Unreal serialization primitives.

use crate::error::{ContainerError, Result};
use byteorder::{ReadBytesExt, LE};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Longest FString (in characters, including the terminator) accepted when reading.
///
/// Anything longer is treated as corruption or a wrong decryption key rather than
/// allocated.
pub const MAX_FSTRING_LEN: i32 = 64 * 1024;

/// Extension trait for reading Unreal `FString`s.
///
/// An FString is an `i32` length followed by either `len` single-byte characters
/// (positive length) or `-len` UTF-16LE code units (negative length). In both cases
/// the length includes a trailing NUL.
pub trait ReadFStringExt: Read {
    fn read_fstring(&mut self) -> Result<String> {
        let len = self.read_i32::<LE>()?;
        if len == 0 {
            return Ok(String::new());
        }
        if !(-MAX_FSTRING_LEN..=MAX_FSTRING_LEN).contains(&len) {
            return Err(ContainerError::InvalidString(len));
        }

        if len > 0 {
            let mut bytes = vec![0u8; len as usize];
            self.read_exact(&mut bytes)?;
            if bytes.pop() != Some(0) {
                return Err(ContainerError::InvalidString(len));
            }
            // Single-byte FStrings are Latin-1
            Ok(bytes.into_iter().map(char::from).collect())
        } else {
            let count = len.unsigned_abs() as usize;
            let mut units = Vec::with_capacity(count);
            for _ in 0..count {
                units.push(self.read_u16::<LE>()?);
            }
            if units.pop() != Some(0) {
                return Err(ContainerError::InvalidString(len));
            }
            Ok(String::from_utf16_lossy(&units))
        }
    }
}

impl<R: Read + ?Sized> ReadFStringExt for R {}

/// Number of unread bytes left in an in-memory cursor.
pub(crate) fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

/// Validate an element count against the bytes left, so corrupt counts fail fast
/// instead of driving huge allocations.
pub(crate) fn checked_count(
    cursor: &Cursor<&[u8]>,
    count: u64,
    min_element_size: u64,
    what: &'static str,
) -> Result<usize> {
    if count.saturating_mul(min_element_size) > remaining(cursor) {
        return Err(ContainerError::malformed(
            what,
            format!("count {} exceeds remaining {} bytes", count, remaining(cursor)),
        ));
    }
    Ok(count as usize)
}

/// Read a block at an absolute offset, checking it lies inside the file.
pub(crate) fn read_block<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    size: u64,
    file_len: u64,
    what: &'static str,
) -> Result<Vec<u8>> {
    let end = offset
        .checked_add(size)
        .ok_or_else(|| ContainerError::malformed(what, "offset overflow"))?;
    if end > file_len {
        return Err(ContainerError::malformed(
            what,
            format!("block {}..{} lies outside file of {} bytes", offset, end, file_len),
        ));
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut bytes = vec![0u8; size as usize];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Serialize an FString the way the engine does: ASCII as single bytes, anything
/// else as UTF-16LE with a negative length.
#[cfg(any(test, feature = "fixtures"))]
pub(crate) fn write_fstring(out: &mut Vec<u8>, value: &str) {
    if value.is_empty() {
        out.extend_from_slice(&0i32.to_le_bytes());
    } else if value.is_ascii() {
        out.extend_from_slice(&(value.len() as i32 + 1).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    } else {
        let units: Vec<u16> = value.encode_utf16().collect();
        out.extend_from_slice(&(-(units.len() as i32 + 1)).to_le_bytes());
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bytes: &[u8]) -> Result<String> {
        Cursor::new(bytes).read_fstring()
    }

    #[test]
    fn test_read_ansi_fstring() {
        let mut bytes = Vec::new();
        write_fstring(&mut bytes, "../../../Game/");
        assert_eq!(read(&bytes).unwrap(), "../../../Game/");
    }

    #[test]
    fn test_read_utf16_fstring() {
        let mut bytes = Vec::new();
        write_fstring(&mut bytes, "Héros/剑");
        assert!(i32::from_le_bytes(bytes[..4].try_into().unwrap()) < 0);
        assert_eq!(read(&bytes).unwrap(), "Héros/剑");
    }

    #[test]
    fn test_read_empty_fstring() {
        assert_eq!(read(&0i32.to_le_bytes()).unwrap(), "");
    }

    #[test]
    fn test_unterminated_fstring_is_rejected() {
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        assert!(matches!(read(&bytes), Err(ContainerError::InvalidString(3))));
    }

    #[test]
    fn test_oversized_fstring_length_is_rejected() {
        let bytes = (MAX_FSTRING_LEN + 1).to_le_bytes();
        assert!(matches!(read(&bytes), Err(ContainerError::InvalidString(_))));
    }

    #[test]
    fn test_checked_count_rejects_impossible_counts() {
        let data = [0u8; 8];
        let cursor = Cursor::new(&data[..]);
        assert!(checked_count(&cursor, 2, 4, "test").is_ok());
        assert!(checked_count(&cursor, 3, 4, "test").is_err());
    }
}
