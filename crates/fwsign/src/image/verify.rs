//! Full image verification, as a loader would perform it before trusting a
//! payload.

use super::layout::{FirmwareImage, ImageState};
use crate::crypto::{signer, VerifyingKey};
use crate::integrity::crc32;
use std::fmt;

/// Outcome of checking one signature slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// The signature verifies against the supplied key.
    Valid,
    /// The signature does not verify, or is malformed.
    Invalid,
    /// The slot is all zero.
    Missing,
    /// No key was supplied for this slot.
    Unchecked,
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignatureStatus::Valid => "valid",
            SignatureStatus::Invalid => "INVALID",
            SignatureStatus::Missing => "missing",
            SignatureStatus::Unchecked => "not checked",
        };
        f.write_str(s)
    }
}

/// Result of [`verify_image`], one entry per check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Header filesize matches the payload length.
    pub size_ok: bool,
    /// Header CRC matches the payload.
    pub crc_ok: bool,
    /// Header padding is all zero.
    pub padding_ok: bool,
    /// Header signature, checked against the first key.
    pub header_signature: SignatureStatus,
    /// Payload signature, checked against the first key.
    pub primary_signature: SignatureStatus,
    /// Counter-signature, checked against the second key.
    pub secondary_signature: SignatureStatus,
    /// State derived from the secondary slot.
    pub state: ImageState,
}

impl VerificationReport {
    /// Everything checked passed and both custodians signed.
    pub fn is_trusted(&self) -> bool {
        self.size_ok
            && self.crc_ok
            && self.padding_ok
            && self.header_signature == SignatureStatus::Valid
            && self.primary_signature == SignatureStatus::Valid
            && self.secondary_signature == SignatureStatus::Valid
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ok = |b: bool| if b { "ok" } else { "MISMATCH" };
        writeln!(f, "Filesize: {}", ok(self.size_ok))?;
        writeln!(f, "CRC: {}", ok(self.crc_ok))?;
        writeln!(f, "Padding: {}", ok(self.padding_ok))?;
        writeln!(f, "Header Sig: {}", self.header_signature)?;
        writeln!(f, "First Sig: {}", self.primary_signature)?;
        writeln!(f, "Second Sig: {}", self.secondary_signature)?;
        write!(
            f,
            "Result: {}",
            if self.is_trusted() { "TRUSTED" } else { "NOT TRUSTED" }
        )
    }
}

/// Check `image` against the first key and, optionally, the second.
///
/// The header signature and primary signature must come from `first`; the
/// secondary signature from `second`.
pub fn verify_image(
    image: &FirmwareImage,
    first: &VerifyingKey,
    second: Option<&VerifyingKey>,
) -> VerificationReport {
    let size_ok = image.payload_size_matches();
    let crc_ok = crc32(&image.payload) == image.header.crc32();
    let padding_ok = image.header.padding_is_zero();

    let header_bytes = image.header.to_bytes();
    let header_signature = check(first, &header_bytes, image.header_signature.as_bytes());
    let primary_signature = check(first, &image.payload, image.primary_signature.as_bytes());

    let secondary_signature = if image.secondary_signature.is_empty() {
        SignatureStatus::Missing
    } else {
        match second {
            Some(key) => check(key, &image.payload, image.secondary_signature.as_bytes()),
            None => SignatureStatus::Unchecked,
        }
    };

    let report = VerificationReport {
        size_ok,
        crc_ok,
        padding_ok,
        header_signature,
        primary_signature,
        secondary_signature,
        state: image.state(),
    };
    log::debug!("verification: {:?}", report);
    report
}

fn check(key: &VerifyingKey, message: &[u8], signature: &signer::RawSignature) -> SignatureStatus {
    if signature.iter().all(|&b| b == 0) {
        SignatureStatus::Missing
    } else if signer::verify(key, message, signature) {
        SignatureStatus::Valid
    } else {
        SignatureStatus::Invalid
    }
}
