//! Structural decoding of images for diagnostics.
//!
//! Nothing here checks a signature; see [`super::verify`] for that.

use super::layout::{FirmwareImage, ImageState};
use super::Version;
use crate::integrity::sha256;
use crate::Result;
use std::fmt;

/// Every field of an image, decoded and raw.
///
/// The `*_hex` fields follow the established presentation: filesize and the
/// two versions are shown byte-reversed (big-endian), magic and CRC exactly as
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub filesize: u32,
    pub filesize_hex: String,
    pub magic_hex: String,
    pub firmware_version: Version,
    pub firmware_version_hex: String,
    pub hardware_version: Version,
    pub hardware_version_hex: String,
    pub crc32: u32,
    pub crc32_hex: String,
    /// False when any of the 44 padding bytes is set.
    pub padding_zero: bool,
    pub raw_header_hex: String,
    pub header_signature_hex: String,
    pub primary_signature_hex: String,
    pub secondary_signature_hex: String,
    pub state: ImageState,
    pub payload_len: usize,
    pub payload_sha256_hex: String,
}

/// Decode the fixed prefix of `data`.
///
/// # Errors
///
/// Returns [`crate::Error::TruncatedImage`] when `data` is shorter than 256 bytes.
pub fn inspect(data: &[u8]) -> Result<ImageReport> {
    let image = FirmwareImage::parse(data)?;
    Ok(ImageReport::from_image(&image))
}

impl ImageReport {
    /// Build the report for an already-parsed image.
    pub fn from_image(image: &FirmwareImage) -> Self {
        let header = &image.header;
        Self {
            filesize: header.filesize(),
            filesize_hex: header.filesize_hex(),
            magic_hex: header.magic_hex(),
            firmware_version: header.firmware_version(),
            firmware_version_hex: header.firmware_version_hex(),
            hardware_version: header.hardware_version(),
            hardware_version_hex: header.hardware_version_hex(),
            crc32: header.crc32(),
            crc32_hex: header.crc32_hex(),
            padding_zero: header.padding_is_zero(),
            raw_header_hex: hex::encode(header.to_bytes()),
            header_signature_hex: image.header_signature.to_hex(),
            primary_signature_hex: image.primary_signature.to_hex(),
            secondary_signature_hex: image.secondary_signature.to_hex(),
            state: image.state(),
            payload_len: image.payload.len(),
            payload_sha256_hex: hex::encode(sha256(&image.payload)),
        }
    }
}

impl fmt::Display for ImageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Filesize: {} ({})", self.filesize_hex, self.filesize)?;
        writeln!(f, "Magic No: {}", self.magic_hex)?;
        writeln!(
            f,
            "Firmware Version: {} ({})",
            self.firmware_version_hex, self.firmware_version
        )?;
        writeln!(
            f,
            "Hardware Version: {} ({})",
            self.hardware_version_hex, self.hardware_version
        )?;
        writeln!(f, "CRC Value: {}", self.crc32_hex)?;
        if !self.padding_zero {
            writeln!(f, "Padding: NON-ZERO")?;
        }
        writeln!(f)?;
        writeln!(f, "Raw header data: {}", self.raw_header_hex)?;
        writeln!(f, "Header Sig: {}", self.header_signature_hex)?;
        writeln!(f)?;
        writeln!(f, "First Sig: {}", self.primary_signature_hex)?;
        writeln!(f, "Second Sig: {}", self.secondary_signature_hex)?;
        writeln!(f)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Payload: {} bytes", self.payload_len)?;
        write!(f, "Payload SHA-256: {}", self.payload_sha256_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::HeaderBlock;
    use crate::Error;

    #[test]
    fn test_inspect_presentation() {
        let header = HeaderBlock::new(
            10,
            [0xde, 0xad, 0xbe, 0xef],
            Version::new(1, 0, 0, 5),
            Version::new(2, 0, 0, 0),
            0xa1b2_c3d4,
        );
        let mut data = header.to_bytes().to_vec();
        data.extend_from_slice(&[0x01; 64]);
        data.extend_from_slice(&[0x02; 64]);
        data.extend_from_slice(&[0x00; 64]);
        data.extend_from_slice(&[0xff; 10]);

        let report = inspect(&data).unwrap();
        assert_eq!(report.filesize_hex, "0000000a");
        assert_eq!(report.magic_hex, "deadbeef");
        assert_eq!(report.firmware_version_hex, "01000005");
        assert_eq!(report.hardware_version_hex, "02000000");
        assert_eq!(report.crc32_hex, "d4c3b2a1");
        assert_eq!(report.secondary_signature_hex, "00".repeat(64));
        assert_eq!(report.state, ImageState::SingleSigned);
        assert_eq!(report.payload_len, 10);
        assert!(report.padding_zero);

        let text = report.to_string();
        assert!(text.contains("Filesize: 0000000a (10)"));
        assert!(text.contains("Magic No: deadbeef"));
        assert!(text.contains("Firmware Version: 01000005 (1:0:0:5)"));
        assert!(!text.contains("Padding"));
    }

    #[test]
    fn test_inspect_flags_dirty_padding() {
        let mut data = vec![0u8; 256];
        data[63] = 0x5a;

        let report = inspect(&data).unwrap();
        assert!(!report.padding_zero);
        assert!(report.to_string().contains("Padding: NON-ZERO"));
    }

    #[test]
    fn test_inspect_truncated() {
        assert!(matches!(
            inspect(&[0u8; 100]),
            Err(Error::TruncatedImage { len: 100 })
        ));
    }
}
