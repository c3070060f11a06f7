//! Version manifest parsing.
//!
//! The manifest is a text file with one `key = value` pair per line:
//!
//! ```text
//! firmware version = 1:0:0:5
//! hardware version = 2:0:0:0
//! magic number = deadbeef
//! ```
//!
//! Keys and values are trimmed, blank lines and `#` comments are skipped and
//! unknown keys are ignored.

use crate::image::header::parse_magic;
use crate::image::Version;
use crate::{Error, Result};
use std::path::Path;
use std::str::FromStr;

/// Key holding the firmware version (`a:b:c:d`).
pub const FIRMWARE_VERSION_KEY: &str = "firmware version";
/// Key holding the hardware version (`a:b:c:d`).
pub const HARDWARE_VERSION_KEY: &str = "hardware version";
/// Key holding the 4-byte magic number in hex.
pub const MAGIC_NUMBER_KEY: &str = "magic number";

/// Header metadata supplied alongside a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manifest {
    /// Version of the firmware payload.
    pub firmware_version: Version,
    /// Hardware revision the payload targets.
    pub hardware_version: Version,
    /// Image type marker, copied into the header verbatim.
    pub magic: [u8; 4],
}

impl Manifest {
    /// Create a manifest from already-parsed values.
    pub fn new(firmware_version: Version, hardware_version: Version, magic: [u8; 4]) -> Self {
        Self {
            firmware_version,
            hardware_version,
            magic,
        }
    }

    /// Read and parse a manifest file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        text.parse()
    }
}

impl FromStr for Manifest {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut firmware = None;
        let mut hardware = None;
        let mut magic = None;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| Error::ManifestSyntax {
                line: index + 1,
                content: line.to_string(),
            })?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                FIRMWARE_VERSION_KEY => firmware = Some(value),
                HARDWARE_VERSION_KEY => hardware = Some(value),
                MAGIC_NUMBER_KEY => magic = Some(value),
                _ => {}
            }
        }

        let firmware = firmware.ok_or(Error::ManifestFieldMissing(FIRMWARE_VERSION_KEY))?;
        let hardware = hardware.ok_or(Error::ManifestFieldMissing(HARDWARE_VERSION_KEY))?;
        let magic = magic.ok_or(Error::ManifestFieldMissing(MAGIC_NUMBER_KEY))?;

        let manifest = Self {
            firmware_version: firmware.parse()?,
            hardware_version: hardware.parse()?,
            magic: parse_magic(magic)?,
        };

        log::debug!(
            "manifest: firmware {}, hardware {}, magic {}",
            manifest.firmware_version,
            manifest.hardware_version,
            hex::encode(manifest.magic)
        );

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let text = "firmware version = 1:0:0:5\nhardware version = 2:0:0:0\nmagic number = deadbeef\n";
        let manifest: Manifest = text.parse().unwrap();
        assert_eq!(manifest.firmware_version, Version::new(1, 0, 0, 5));
        assert_eq!(manifest.hardware_version, Version::new(2, 0, 0, 0));
        assert_eq!(manifest.magic, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_tight_spacing_comments_and_unknown_keys() {
        let text = "# release build\n\nmagic number=0xcafef00d\nfirmware version=0:1:2:3\nbuild host = ci-7\nhardware version=4:5:6:7\r\n";
        let manifest: Manifest = text.parse().unwrap();
        assert_eq!(manifest.firmware_version, Version::new(0, 1, 2, 3));
        assert_eq!(manifest.hardware_version, Version::new(4, 5, 6, 7));
        assert_eq!(manifest.magic, [0xca, 0xfe, 0xf0, 0x0d]);
    }

    #[test]
    fn test_missing_fields() {
        let err = "hardware version = 2:0:0:0\nmagic number = deadbeef\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, Error::ManifestFieldMissing(FIRMWARE_VERSION_KEY)));

        let err = "firmware version = 1:0:0:5\nmagic number = deadbeef\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, Error::ManifestFieldMissing(HARDWARE_VERSION_KEY)));

        let err = "firmware version = 1:0:0:5\nhardware version = 2:0:0:0\nmagic number =\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, Error::ManifestFieldMissing(MAGIC_NUMBER_KEY)));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = "firmware version = 1:0:0:5\nthis line is broken\n"
            .parse::<Manifest>()
            .unwrap_err();
        match err {
            Error::ManifestSyntax { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "this line is broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_version_propagates() {
        let err = "firmware version = 1:0:5\nhardware version = 2:0:0:0\nmagic number = deadbeef\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, Error::VersionFormatError { .. }));
    }
}
