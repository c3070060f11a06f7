//! Error types for fwsign operations.
//!
//! This module defines the [`enum@Error`] enum covering all failure cases
//! when building, counter-signing, inspecting or verifying firmware images:
//! manifest problems, malformed key material, truncated inputs and
//! state-machine violations.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error

use std::path::PathBuf;
use thiserror::Error;

/// Error type for fwsign operations.
///
/// All public functions in this crate return [`crate::Result<T>`], which uses this error type.
/// Every variant is terminal for the operation that raised it; no output file is
/// left behind when one is returned.
///
/// # Examples
///
/// ```no_run
/// use fwsign::{Error, FwSign};
///
/// let key = fwsign::crypto::load_signing_key("private_key2.h")?;
/// match FwSign::new().signing_key(key).sign_header("fw_Header.bin", "fw_Signed.bin") {
///     Ok(()) => println!("Counter-signed"),
///     Err(Error::AlreadyDualSigned) => eprintln!("Image already carries a second signature"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok::<(), fwsign::Error>(())
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a specific file failed.
    #[error("{}: {source}", .path.display())]
    File {
        /// File that could not be read or written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A required manifest key is absent or has an empty value.
    #[error("Manifest field missing: `{0}`")]
    ManifestFieldMissing(&'static str),

    /// A manifest line could not be split into `key = value`.
    #[error("Manifest line {line} is not a `key = value` pair: {content:?}")]
    ManifestSyntax {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },

    /// A version string is not four `:`-separated integers in `0..=255`.
    #[error("Invalid version {value:?}: {reason}")]
    VersionFormatError {
        /// The version string as written in the manifest.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The magic number does not decode to exactly four bytes.
    #[error("Invalid magic number {0:?}: expected 4 bytes of hex")]
    InvalidMagicNumber(String),

    /// Key bytes do not describe a usable P-256 key.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// A header buffer is shorter than the 64-byte header block.
    #[error("Truncated header: {len} bytes, need {}", crate::image::HEADER_SIZE)]
    TruncatedHeader {
        /// Length of the buffer that was supplied.
        len: usize,
    },

    /// An image is shorter than the 256-byte fixed prefix.
    #[error("Truncated image: {len} bytes, need at least {}", crate::image::PREFIX_SIZE)]
    TruncatedImage {
        /// Length of the image that was supplied.
        len: usize,
    },

    /// The secondary signature slot is already populated.
    #[error("The image already contains a second signature")]
    AlreadyDualSigned,

    /// The counter-signing key is the key that produced the primary signature.
    #[error("The second signature must come from a different key than the first")]
    SameSigningKey,

    /// The payload does not fit the 32-bit filesize field.
    #[error("Payload of {0} bytes exceeds the 32-bit filesize field")]
    PayloadTooLarge(usize),

    /// The header filesize disagrees with the payload that follows the prefix.
    #[error("Header declares {declared} payload bytes but the image carries {actual}")]
    PayloadSizeMismatch {
        /// Filesize field of the header.
        declared: u32,
        /// Bytes actually present after the prefix.
        actual: usize,
    },

    /// A signing operation was attempted without a key.
    ///
    /// Set one with [`crate::FwSign::signing_key`].
    #[error("Missing signing key: {0}")]
    MissingKey(String),
}

impl Error {
    /// Wraps an I/O error with the path it occurred on.
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }
}
