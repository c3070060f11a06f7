//! The 64-byte header block.
//!
//! Fields are laid out back to back from offset 0 and the remainder of the
//! block is zero:
//!
//! | offset | size | field            | encoding      |
//! |--------|------|------------------|---------------|
//! | 0      | 4    | filesize         | little-endian |
//! | 4      | 4    | magic            | as given      |
//! | 8      | 4    | firmware version | little-endian |
//! | 12     | 4    | hardware version | little-endian |
//! | 16     | 4    | crc32            | little-endian |
//! | 20     | 44   | padding          | zero          |

use super::version::Version;
use super::HEADER_SIZE;
use crate::{Error, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Bytes used by the five metadata fields
pub const METADATA_SIZE: usize = 20;

/// Zero bytes completing the block to [`HEADER_SIZE`]
pub const PADDING_SIZE: usize = HEADER_SIZE - METADATA_SIZE;

/// Header block as it appears on disk.
#[repr(C)]
#[derive(Clone, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct HeaderBlock {
    filesize: U32<LittleEndian>,
    magic: [u8; 4],
    firmware_version: U32<LittleEndian>,
    hardware_version: U32<LittleEndian>,
    crc32: U32<LittleEndian>,
    padding: [u8; PADDING_SIZE],
}

const _: () = assert!(std::mem::size_of::<HeaderBlock>() == HEADER_SIZE);

impl HeaderBlock {
    /// Build a header block with zero padding.
    ///
    /// # Arguments
    ///
    /// * `filesize` - Payload length in bytes
    /// * `magic` - Image type marker, stored as given
    /// * `firmware_version` - Version of the payload
    /// * `hardware_version` - Hardware revision the payload targets
    /// * `crc32` - CRC-32 of the payload
    pub fn new(
        filesize: u32,
        magic: [u8; 4],
        firmware_version: Version,
        hardware_version: Version,
        crc32: u32,
    ) -> Self {
        Self {
            filesize: filesize.into(),
            magic,
            firmware_version: firmware_version.as_u32().into(),
            hardware_version: hardware_version.as_u32().into(),
            crc32: crc32.into(),
            padding: [0; PADDING_SIZE],
        }
    }

    /// Read a header block from the start of `data`.
    ///
    /// Bytes beyond the first [`HEADER_SIZE`] are ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (header, _) =
            Self::read_from_prefix(data).map_err(|_| Error::TruncatedHeader { len: data.len() })?;
        Ok(header)
    }

    /// The 64 bytes covered by the header signature.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Declared payload length.
    pub fn filesize(&self) -> u32 {
        self.filesize.get()
    }

    /// Magic number bytes in stored order.
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// Decoded firmware version.
    pub fn firmware_version(&self) -> Version {
        Version::from_u32(self.firmware_version.get())
    }

    /// Decoded hardware version.
    pub fn hardware_version(&self) -> Version {
        Version::from_u32(self.hardware_version.get())
    }

    /// CRC-32 recorded for the payload.
    pub fn crc32(&self) -> u32 {
        self.crc32.get()
    }

    /// Raw bytes of the 4-byte fields in the order they are stored.
    fn raw_field(&self, offset: usize) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.as_bytes()[offset..offset + 4]);
        out
    }

    /// Filesize as big-endian hex, i.e. the stored bytes reversed.
    pub fn filesize_hex(&self) -> String {
        reversed_hex(self.raw_field(0))
    }

    /// Magic as stored, not reversed.
    pub fn magic_hex(&self) -> String {
        hex::encode(self.magic)
    }

    /// Firmware version as big-endian hex, i.e. the stored bytes reversed.
    pub fn firmware_version_hex(&self) -> String {
        reversed_hex(self.raw_field(8))
    }

    /// Hardware version as big-endian hex, i.e. the stored bytes reversed.
    pub fn hardware_version_hex(&self) -> String {
        reversed_hex(self.raw_field(12))
    }

    /// CRC as stored (little-endian), not reversed.
    pub fn crc32_hex(&self) -> String {
        hex::encode(self.raw_field(16))
    }

    /// True when every padding byte is zero.
    pub fn padding_is_zero(&self) -> bool {
        self.padding.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for HeaderBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderBlock")
            .field("filesize", &self.filesize())
            .field("magic", &self.magic_hex())
            .field("firmware_version", &self.firmware_version())
            .field("hardware_version", &self.hardware_version())
            .field("crc32", &format_args!("{:#010x}", self.crc32()))
            .finish()
    }
}

fn reversed_hex(mut bytes: [u8; 4]) -> String {
    bytes.reverse();
    hex::encode(bytes)
}

/// Decode a manifest magic number into its four bytes.
///
/// Accepts an optional `0x` prefix; anything other than exactly four bytes of
/// hex is rejected.
pub fn parse_magic(value: &str) -> Result<[u8; 4]> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|_| Error::InvalidMagicNumber(trimmed.to_string()))?;
    <[u8; 4]>::try_from(bytes).map_err(|_| Error::InvalidMagicNumber(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HeaderBlock {
        HeaderBlock::new(
            10,
            [0xde, 0xad, 0xbe, 0xef],
            Version::new(1, 0, 0, 5),
            Version::new(2, 0, 0, 0),
            0x1234_5678,
        )
    }

    #[test]
    fn test_encoded_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], &[0x0a, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&bytes[8..12], &[0x05, 0, 0, 0x01]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0x02]);
        assert_eq!(&bytes[16..20], &[0x78, 0x56, 0x34, 0x12]);
        assert!(bytes[METADATA_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_display_asymmetry() {
        let header = sample();
        assert_eq!(header.filesize_hex(), "0000000a");
        assert_eq!(header.magic_hex(), "deadbeef");
        assert_eq!(header.firmware_version_hex(), "01000005");
        assert_eq!(header.hardware_version_hex(), "02000000");
        assert_eq!(header.crc32_hex(), "78563412");
    }

    #[test]
    fn test_parse_round_trip() {
        let header = sample();
        let mut buf = header.to_bytes().to_vec();
        buf.extend_from_slice(&[0xaa; 16]);

        let parsed = HeaderBlock::parse(&buf).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.filesize(), 10);
        assert_eq!(parsed.firmware_version(), Version::new(1, 0, 0, 5));
        assert_eq!(parsed.hardware_version(), Version::new(2, 0, 0, 0));
        assert!(parsed.padding_is_zero());
    }

    #[test]
    fn test_parse_truncated() {
        let err = HeaderBlock::parse(&[0u8; 63]).unwrap_err();
        assert!(matches!(err, Error::TruncatedHeader { len: 63 }));
    }

    #[test]
    fn test_parse_magic() {
        assert_eq!(parse_magic("deadbeef").unwrap(), [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(parse_magic("0xCAFEF00D").unwrap(), [0xca, 0xfe, 0xf0, 0x0d]);
        assert!(matches!(parse_magic("dead"), Err(Error::InvalidMagicNumber(_))));
        assert!(matches!(parse_magic("deadbeef00"), Err(Error::InvalidMagicNumber(_))));
        assert!(matches!(parse_magic("zzzzzzzz"), Err(Error::InvalidMagicNumber(_))));
    }
}
