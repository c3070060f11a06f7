//! Whole-image assembly and splitting.
//!
//! A [`FirmwareImage`] owns the five segments of an image. Parsing validates
//! the total length once against [`PREFIX_SIZE`] and then copies each segment
//! out of its named range; serialization writes them back in the same order.

use super::header::HeaderBlock;
use super::{
    HEADER_RANGE, HEADER_SIGNATURE_RANGE, PREFIX_SIZE, PRIMARY_SIGNATURE_RANGE,
    SECONDARY_SIGNATURE_RANGE, SIGNATURE_SIZE,
};
use crate::crypto::RawSignature;
use crate::{Error, Result};
use std::fmt;
use std::ops::Range;

/// One 64-byte signature slot.
///
/// An all-zero slot is a placeholder meaning "not signed yet".
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignatureSlot(RawSignature);

impl SignatureSlot {
    pub const EMPTY: Self = Self([0; SIGNATURE_SIZE]);

    pub fn new(signature: RawSignature) -> Self {
        Self(signature)
    }

    /// True when no byte is set.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &RawSignature {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn read(data: &[u8], range: Range<usize>) -> Self {
        let mut sig = [0u8; SIGNATURE_SIZE];
        sig.copy_from_slice(&data[range]);
        Self(sig)
    }
}

impl Default for SignatureSlot {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for SignatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("SignatureSlot(empty)")
        } else {
            write!(f, "SignatureSlot({})", self.to_hex())
        }
    }
}

/// Where an image is in its signing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Header, header signature and primary signature present; secondary empty.
    SingleSigned,
    /// Secondary signature present. Terminal.
    DualSigned,
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageState::SingleSigned => f.write_str("single-signed"),
            ImageState::DualSigned => f.write_str("dual-signed"),
        }
    }
}

/// A parsed firmware image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    pub header: HeaderBlock,
    pub header_signature: SignatureSlot,
    pub primary_signature: SignatureSlot,
    pub secondary_signature: SignatureSlot,
    pub payload: Vec<u8>,
}

impl FirmwareImage {
    /// Split `data` into its five segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedImage`] when `data` is shorter than the
    /// 256-byte prefix.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PREFIX_SIZE {
            return Err(Error::TruncatedImage { len: data.len() });
        }

        Ok(Self {
            header: HeaderBlock::parse(&data[HEADER_RANGE])?,
            header_signature: SignatureSlot::read(data, HEADER_SIGNATURE_RANGE),
            primary_signature: SignatureSlot::read(data, PRIMARY_SIGNATURE_RANGE),
            secondary_signature: SignatureSlot::read(data, SECONDARY_SIGNATURE_RANGE),
            payload: data[PREFIX_SIZE..].to_vec(),
        })
    }

    /// Read and parse an image file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::file(path, e))?;
        Self::parse(&data)
    }

    /// Dual-signed once any secondary-slot byte is set.
    pub fn state(&self) -> ImageState {
        if self.secondary_signature.is_empty() {
            ImageState::SingleSigned
        } else {
            ImageState::DualSigned
        }
    }

    /// Serialize back to the on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PREFIX_SIZE + self.payload.len());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(self.header_signature.as_bytes());
        buf.extend_from_slice(self.primary_signature.as_bytes());
        buf.extend_from_slice(self.secondary_signature.as_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Whether the header filesize matches the payload carried.
    pub fn payload_size_matches(&self) -> bool {
        self.header.filesize() as usize == self.payload.len()
    }
}
