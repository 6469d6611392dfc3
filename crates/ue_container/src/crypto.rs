//! AES-256 keys, and ECB decryption for encrypted IoStore directory indexes.
//!
//! `.pak` indexes are decrypted by repak; it takes the key as [`AesKey::cipher`].

use crate::error::{ContainerError, Result};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, KeyInit};
use aes::Aes256;
use std::fmt;
use std::str::FromStr;

/// Cipher block size; encrypted regions are always a multiple of this.
pub const AES_BLOCK_SIZE: usize = 16;

/// A 256-bit key used to decrypt pak and IoStore indexes.
#[derive(Clone, PartialEq, Eq)]
pub struct AesKey([u8; 32]);

impl AesKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn cipher(&self) -> Aes256 {
        Aes256::new(GenericArray::from_slice(&self.0))
    }

    /// Decrypt `data` in place. Fails if the length is not block aligned.
    pub fn decrypt_in_place(&self, data: &mut [u8]) -> Result<()> {
        if data.len() % AES_BLOCK_SIZE != 0 {
            return Err(ContainerError::malformed(
                "encrypted block",
                format!("length {} is not a multiple of {}", data.len(), AES_BLOCK_SIZE),
            ));
        }
        let cipher = self.cipher();
        for block in data.chunks_exact_mut(AES_BLOCK_SIZE) {
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }

    /// Zero-pad `data` to the block size and encrypt it in place.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn encrypt_padded(&self, data: &mut Vec<u8>) {
        use aes::cipher::BlockEncrypt;

        let padded = data.len().div_ceil(AES_BLOCK_SIZE) * AES_BLOCK_SIZE;
        data.resize(padded, 0);
        let cipher = self.cipher();
        for block in data.chunks_exact_mut(AES_BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }
}

impl FromStr for AesKey {
    type Err = ContainerError;

    /// Parse a 64-character hex key, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex_text = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(hex_text).map_err(|e| ContainerError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            ContainerError::InvalidKey(format!("expected 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for AesKey {
    // Keys never end up in logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0x000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F";

    #[test]
    fn test_parse_with_and_without_prefix() {
        let with: AesKey = KEY_HEX.parse().unwrap();
        let without: AesKey = KEY_HEX.trim_start_matches("0x").parse().unwrap();
        assert_eq!(with, without);
        assert_eq!(with.as_bytes()[31], 0x1F);
    }

    #[test]
    fn test_parse_rejects_short_key() {
        let err = "0xABCD".parse::<AesKey>().unwrap_err();
        assert!(matches!(err, ContainerError::InvalidKey(_)));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("zz".repeat(32).parse::<AesKey>().is_err());
    }

    #[test]
    fn test_encrypt_then_decrypt_restores_padded_plaintext() {
        let key: AesKey = KEY_HEX.parse().unwrap();
        let mut data = b"../../../Game/Content/".to_vec();
        key.encrypt_padded(&mut data);
        assert_eq!(data.len(), 32);
        assert_ne!(&data[..4], b"../.");

        key.decrypt_in_place(&mut data).unwrap();
        assert!(data.starts_with(b"../../../Game/Content/"));
    }

    #[test]
    fn test_decrypt_rejects_unaligned_length() {
        let key = AesKey::from_bytes([7; 32]);
        assert!(key.decrypt_in_place(&mut [0u8; 15]).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = AesKey::from_bytes([0xAB; 32]);
        assert_eq!(format!("{:?}", key), "AesKey(..)");
    }
}
