//! Payload checksums.
//!
//! The CRC-32 (ISO-HDLC, reflected polynomial `0xEDB88320`) is embedded in the
//! header block. The SHA-256 digest is never stored; it is reported by the
//! inspector so two images can be compared at a glance.

use crc32fast::Hasher;
use sha2::{Digest, Sha256};

/// CRC-32/ISO-HDLC of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_values() {
        assert_eq!(crc32(b""), 0x0000_0000);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_ten_ff_bytes() {
        let data = [0xffu8; 10];
        assert_eq!(crc32(&data), crc32(&data));
        assert_ne!(crc32(&data), crc32(&data[..9]));
    }

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
