//! FwSign builder API
//!
//! Provides a builder pattern interface for the two image transitions:
//!
//! - `add_header`: raw payload → single-signed image
//! - `sign_header`: single-signed image → dual-signed image
//!
//! plus read-only helpers to decode and verify existing images.

use crate::crypto::{signer, SigningKey, VerifyingKey};
use crate::image::{
    inspect, verify_image, FirmwareImage, HeaderBlock, ImageReport, ImageState, SignatureSlot,
    VerificationReport,
};
use crate::integrity::crc32;
use crate::manifest::Manifest;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Firmware image signing tool with builder pattern API.
///
/// # Example
///
/// ```no_run
/// use fwsign::FwSign;
/// use fwsign::crypto::load_signing_key;
///
/// // Build system: add the header and the first signature.
/// FwSign::new()
///     .signing_key(load_signing_key("private_key1.h")?)
///     .add_header("BlinkLed.bin", "BlinkLed-version.txt", "BlinkLed_Header.bin")?;
///
/// // Release authority: counter-sign.
/// FwSign::new()
///     .signing_key(load_signing_key("private_key2.h")?)
///     .sign_header("BlinkLed_Header.bin", "BlinkLed_Signed.bin")?;
/// # Ok::<(), fwsign::Error>(())
/// ```
pub struct FwSign {
    signing_key: Option<SigningKey>,
    allow_same_key: bool,
}

impl FwSign {
    /// Create a new FwSign builder.
    pub fn new() -> Self {
        Self {
            signing_key: None,
            allow_same_key: false,
        }
    }

    /// Set the key used by the next transition.
    pub fn signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Permit counter-signing with the key that made the primary signature.
    ///
    /// Off by default: a dual-signed image is supposed to carry two custodians.
    pub fn allow_same_key(mut self, allow: bool) -> Self {
        self.allow_same_key = allow;
        self
    }

    /// Validate the builder configuration.
    ///
    /// Returns an error if no signing key is set.
    pub fn validate(&self) -> Result<()> {
        if self.signing_key.is_none() {
            return Err(Error::MissingKey(
                "Signing key must be set using .signing_key()".into(),
            ));
        }
        Ok(())
    }

    fn key(&self) -> Result<&SigningKey> {
        self.validate()?;
        self.signing_key
            .as_ref()
            .ok_or_else(|| Error::MissingKey("No signing key configured".into()))
    }

    /// Add the header block and first signatures to a raw payload.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw firmware binary
    /// * `manifest` - Version manifest (see [`crate::manifest`])
    /// * `output` - Path for the single-signed image
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No signing key is set
    /// - The payload or manifest cannot be read
    /// - The manifest is incomplete or malformed
    /// - The payload exceeds 4 GiB
    /// - The output cannot be written
    pub fn add_header(
        &self,
        input: impl AsRef<Path>,
        manifest: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<()> {
        let key = self.key()?;
        let input = input.as_ref();
        let payload = std::fs::read(input).map_err(|e| Error::file(input, e))?;
        let manifest = Manifest::open(manifest)?;

        let image = build_image(key, &payload, &manifest)?;
        write_atomic(output.as_ref(), &image.to_bytes(), input)?;

        log::info!(
            "{} -> {} ({}, {} byte payload)",
            input.display(),
            output.as_ref().display(),
            image.state(),
            payload.len()
        );
        Ok(())
    }

    /// In-memory variant of [`FwSign::add_header`].
    pub fn add_header_bytes(&self, payload: &[u8], manifest: &Manifest) -> Result<Vec<u8>> {
        Ok(build_image(self.key()?, payload, manifest)?.to_bytes())
    }

    /// Attach the secondary signature to a single-signed image.
    ///
    /// Only bytes `[192, 256)` differ between input and output. Nothing is
    /// written when the image is already dual-signed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No signing key is set
    /// - The image is shorter than 256 bytes
    /// - The image is already dual-signed
    /// - The key is the one that made the primary signature (unless allowed)
    /// - The header filesize disagrees with the payload
    pub fn sign_header(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let key = self.key()?;
        let input = input.as_ref();
        let image = FirmwareImage::open(input)?;

        let signed = countersign_image(key, &image, self.allow_same_key)?;
        write_atomic(output.as_ref(), &signed.to_bytes(), input)?;

        log::info!(
            "{} -> {} ({})",
            input.display(),
            output.as_ref().display(),
            signed.state()
        );
        Ok(())
    }

    /// In-memory variant of [`FwSign::sign_header`].
    pub fn sign_header_bytes(&self, image: &[u8]) -> Result<Vec<u8>> {
        let image = FirmwareImage::parse(image)?;
        Ok(countersign_image(self.key()?, &image, self.allow_same_key)?.to_bytes())
    }
}

impl Default for FwSign {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble a single-signed image from a payload.
pub fn build_image(key: &SigningKey, payload: &[u8], manifest: &Manifest) -> Result<FirmwareImage> {
    let filesize = u32::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge(payload.len()))?;
    let crc = crc32(payload);
    log::debug!("payload: {} bytes, crc32 {:#010x}", filesize, crc);

    let header = HeaderBlock::new(
        filesize,
        manifest.magic,
        manifest.firmware_version,
        manifest.hardware_version,
        crc,
    );
    let header_signature = signer::sign(key, &header.to_bytes());
    let primary_signature = signer::sign(key, payload);

    Ok(FirmwareImage {
        header,
        header_signature: SignatureSlot::new(header_signature),
        primary_signature: SignatureSlot::new(primary_signature),
        secondary_signature: SignatureSlot::EMPTY,
        payload: payload.to_vec(),
    })
}

/// Produce the dual-signed form of `image`, leaving every other segment as is.
pub fn countersign_image(
    key: &SigningKey,
    image: &FirmwareImage,
    allow_same_key: bool,
) -> Result<FirmwareImage> {
    if image.state() == ImageState::DualSigned {
        return Err(Error::AlreadyDualSigned);
    }

    if !image.payload_size_matches() {
        return Err(Error::PayloadSizeMismatch {
            declared: image.header.filesize(),
            actual: image.payload.len(),
        });
    }

    if !allow_same_key
        && signer::verify(
            key.verifying_key(),
            &image.payload,
            image.primary_signature.as_bytes(),
        )
    {
        return Err(Error::SameSigningKey);
    }

    let mut signed = image.clone();
    signed.secondary_signature = SignatureSlot::new(signer::sign(key, &image.payload));
    Ok(signed)
}

/// Read an image file and decode its structure.
pub fn decode_header(input: impl AsRef<Path>) -> Result<ImageReport> {
    let input = input.as_ref();
    let data = std::fs::read(input).map_err(|e| Error::file(input, e))?;
    inspect(&data)
}

/// Read an image file and check it against the given public keys.
pub fn verify_file(
    input: impl AsRef<Path>,
    first: &VerifyingKey,
    second: Option<&VerifyingKey>,
) -> Result<VerificationReport> {
    let image = FirmwareImage::open(input)?;
    Ok(verify_image(&image, first, second))
}

/// Write `data` to `path` through a temporary file in the same directory, so
/// `path` either keeps its old contents or holds the complete new ones.
///
/// The output takes the permissions of `source`, the file it was derived from.
fn write_atomic(path: &Path, data: &[u8], source: &Path) -> Result<()> {
    let permissions = std::fs::metadata(source)
        .map_err(|e| Error::file(source, e))?
        .permissions();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::file(dir, e))?;
    tmp.write_all(data).map_err(|e| Error::file(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::file(tmp.path(), e))?;
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| Error::file(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::file(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signing_key_from_bytes;
    use crate::image::Version;

    fn manifest() -> Manifest {
        Manifest::new(Version::new(1, 0, 0, 5), Version::new(2, 0, 0, 0), [0xde, 0xad, 0xbe, 0xef])
    }

    #[test]
    fn test_builder_default() {
        let fwsign = FwSign::default();
        assert!(fwsign.signing_key.is_none());
        assert!(!fwsign.allow_same_key);
    }

    #[test]
    fn test_validate_no_key() {
        let result = FwSign::new().validate();
        match result {
            Err(Error::MissingKey(msg)) => assert!(msg.contains("Signing key must be set")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_add_header_requires_key() {
        let result = FwSign::new().add_header_bytes(b"fw", &manifest());
        assert!(matches!(result, Err(Error::MissingKey(_))));
    }

    #[test]
    fn test_build_image_fields() {
        let key = signing_key_from_bytes(&[0x07; 32]).unwrap();
        let image = build_image(&key, b"hello", &manifest()).unwrap();

        assert_eq!(image.header.filesize(), 5);
        assert_eq!(image.header.crc32(), crc32(b"hello"));
        assert_eq!(image.state(), ImageState::SingleSigned);
        assert!(signer::verify(
            key.verifying_key(),
            &image.header.to_bytes(),
            image.header_signature.as_bytes()
        ));
    }

    #[test]
    fn test_countersign_refuses_same_key() {
        let key = signing_key_from_bytes(&[0x07; 32]).unwrap();
        let image = build_image(&key, b"hello", &manifest()).unwrap();

        assert!(matches!(
            countersign_image(&key, &image, false),
            Err(Error::SameSigningKey)
        ));

        let signed = countersign_image(&key, &image, true).unwrap();
        assert_eq!(signed.secondary_signature, signed.primary_signature);
    }

    #[test]
    fn test_countersign_rejects_size_mismatch() {
        let key1 = signing_key_from_bytes(&[0x07; 32]).unwrap();
        let key2 = signing_key_from_bytes(&[0x08; 32]).unwrap();
        let mut image = build_image(&key1, b"hello", &manifest()).unwrap();
        image.payload.push(0);

        assert!(matches!(
            countersign_image(&key2, &image, false),
            Err(Error::PayloadSizeMismatch { declared: 5, actual: 6 })
        ));
    }
}
