//! Four-part firmware and hardware version numbers.
//!
//! Versions are written `major:minor:patch:build` in the manifest, composed
//! into a `u32` as `major << 24 | minor << 16 | patch << 8 | build` and stored
//! in the header in little-endian byte order.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A `major:minor:patch:build` version with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Most significant byte of the composed value.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch level.
    pub patch: u8,
    /// Build number, least significant byte.
    pub build: u8,
}

impl Version {
    /// Create a version from its four components.
    pub const fn new(major: u8, minor: u8, patch: u8, build: u8) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Composed 32-bit value, major in the most significant byte.
    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes([self.major, self.minor, self.patch, self.build])
    }

    /// Split a composed value back into components.
    pub const fn from_u32(value: u32) -> Self {
        let [major, minor, patch, build] = value.to_be_bytes();
        Self::new(major, minor, patch, build)
    }

    /// Encoding stored in the header block.
    pub const fn to_le_bytes(&self) -> [u8; 4] {
        self.as_u32().to_le_bytes()
    }

    /// Decode the header encoding produced by [`Version::to_le_bytes`].
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self::from_u32(u32::from_le_bytes(bytes))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        let invalid = |reason: String| Error::VersionFormatError {
            value: value.to_string(),
            reason,
        };

        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() != 4 {
            return Err(invalid(format!(
                "expected 4 `:`-separated components, found {}",
                parts.len()
            )));
        }

        let mut components = [0u8; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            let part = part.trim();
            let n: u32 = part
                .parse()
                .map_err(|_| invalid(format!("component {part:?} is not a decimal integer")))?;
            *slot = u8::try_from(n)
                .map_err(|_| invalid(format!("component {n} does not fit in 8 bits")))?;
        }

        let [major, minor, patch, build] = components;
        Ok(Self::new(major, minor, patch, build))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.major, self.minor, self.patch, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_encode() {
        let v: Version = "1:0:0:5".parse().unwrap();
        assert_eq!(v, Version::new(1, 0, 0, 5));
        assert_eq!(v.as_u32(), 0x0100_0005);
        assert_eq!(v.to_le_bytes(), [0x05, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_round_trip_extremes() {
        for v in [Version::new(0, 0, 0, 0), Version::new(255, 255, 255, 255), Version::new(2, 17, 0, 254)] {
            assert_eq!(Version::from_le_bytes(v.to_le_bytes()), v);
            assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
        }
    }

    #[test]
    fn test_tolerates_whitespace() {
        let v: Version = " 3 : 2 : 1 : 0 \n".parse().unwrap();
        assert_eq!(v, Version::new(3, 2, 1, 0));
    }

    #[test]
    fn test_rejects_wrong_component_count() {
        for bad in ["1:2:3", "1:2:3:4:5", "", "1.2.3.4"] {
            assert!(matches!(
                bad.parse::<Version>(),
                Err(Error::VersionFormatError { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = "1:x:0:0".parse::<Version>().unwrap_err();
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn test_rejects_component_over_255() {
        let err = "1:256:0:0".parse::<Version>().unwrap_err();
        match err {
            Error::VersionFormatError { value, reason } => {
                assert_eq!(value, "1:256:0:0");
                assert!(reason.contains("8 bits"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
