//! P-256 key material.
//!
//! The signing code only ever needs 32 raw scalar bytes. How those bytes are
//! stored is up to the caller; the loaders here accept the formats people
//! actually have lying around:
//!
//! - **PEM**: PKCS#8 (`BEGIN PRIVATE KEY`) or SEC1 (`BEGIN EC PRIVATE KEY`)
//!   private keys, SPKI (`BEGIN PUBLIC KEY`) public keys
//! - **Marker line**: a `PRIVATE_KEY_HEX=<hex>` or `PUBLIC_KEY_HEX=<hex>`
//!   line anywhere in a text file, as written into the C headers produced by
//!   [`crate::crypto::export`]
//! - **Hex**: a file holding only the hex encoding
//! - **Raw**: the bytes themselves
//!
//! # Examples
//!
//! ```no_run
//! use fwsign::crypto::{load_signing_key, load_verifying_key};
//!
//! let first = load_signing_key("private_key1.h")?;
//! let second_pub = load_verifying_key("public_key2.h")?;
//! # Ok::<(), fwsign::Error>(())
//! ```

use crate::{Error, Result};
use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p256::SecretKey;
use rand_core::OsRng;
use std::path::Path;

/// Marker preceding the hex private key in generated headers
pub const PRIVATE_KEY_MARKER: &str = "PRIVATE_KEY_HEX=";

/// Marker preceding the hex public key in generated headers
pub const PUBLIC_KEY_MARKER: &str = "PUBLIC_KEY_HEX=";

/// Length of a P-256 private scalar
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Length of a compressed SEC1 P-256 point
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Generate a fresh signing key from the operating system RNG.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// Build a signing key from exactly 32 big-endian scalar bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyMaterial`] if the length is wrong or the scalar
/// is zero or not below the curve order.
pub fn signing_key_from_bytes(bytes: &[u8]) -> Result<SigningKey> {
    if bytes.len() != PRIVATE_KEY_SIZE {
        return Err(Error::InvalidKeyMaterial(format!(
            "expected {} private key bytes, got {}",
            PRIVATE_KEY_SIZE,
            bytes.len()
        )));
    }
    SigningKey::from_slice(bytes)
        .map_err(|_| Error::InvalidKeyMaterial("private key is not a valid P-256 scalar".into()))
}

/// Build a verifying key from a SEC1 encoded point (compressed or not).
pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey> {
    VerifyingKey::from_sec1_bytes(bytes).map_err(|_| {
        Error::InvalidKeyMaterial(format!(
            "{} bytes do not encode a P-256 public point",
            bytes.len()
        ))
    })
}

/// Compressed SEC1 encoding of the public half of `key`.
pub fn public_key_bytes(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(true).as_bytes().to_vec()
}

/// Load a signing key from `path`. See the module docs for accepted formats.
pub fn load_signing_key(path: impl AsRef<Path>) -> Result<SigningKey> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file(path, e))?;
    parse_signing_key(&data).map_err(|e| match e {
        Error::InvalidKeyMaterial(msg) => {
            Error::InvalidKeyMaterial(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Load a verifying key from `path`. See the module docs for accepted formats.
pub fn load_verifying_key(path: impl AsRef<Path>) -> Result<VerifyingKey> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file(path, e))?;
    parse_verifying_key(&data).map_err(|e| match e {
        Error::InvalidKeyMaterial(msg) => {
            Error::InvalidKeyMaterial(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse a signing key from file contents.
pub fn parse_signing_key(data: &[u8]) -> Result<SigningKey> {
    if let Ok(text) = std::str::from_utf8(data) {
        let text = text.trim();
        if text.starts_with("-----BEGIN") {
            if let Ok(key) = SigningKey::from_pkcs8_pem(text) {
                return Ok(key);
            }
            if let Ok(secret) = SecretKey::from_sec1_pem(text) {
                return Ok(SigningKey::from(secret));
            }
            return Err(Error::InvalidKeyMaterial(
                "PEM is neither a PKCS#8 nor a SEC1 P-256 private key".into(),
            ));
        }
        if let Some(hex_str) = find_marker(text, PRIVATE_KEY_MARKER) {
            return signing_key_from_bytes(&decode_hex(hex_str)?);
        }
        if is_hex(text) {
            return signing_key_from_bytes(&decode_hex(text)?);
        }
    }

    if data.len() == PRIVATE_KEY_SIZE {
        return signing_key_from_bytes(data);
    }

    Err(Error::InvalidKeyMaterial(
        "unrecognized private key format".into(),
    ))
}

/// Parse a verifying key from file contents.
pub fn parse_verifying_key(data: &[u8]) -> Result<VerifyingKey> {
    if let Ok(text) = std::str::from_utf8(data) {
        let text = text.trim();
        if text.starts_with("-----BEGIN") {
            return VerifyingKey::from_public_key_pem(text).map_err(|_| {
                Error::InvalidKeyMaterial("PEM is not a P-256 SubjectPublicKeyInfo".into())
            });
        }
        if let Some(hex_str) = find_marker(text, PUBLIC_KEY_MARKER) {
            return verifying_key_from_bytes(&decode_hex(hex_str)?);
        }
        if is_hex(text) {
            return verifying_key_from_bytes(&decode_hex(text)?);
        }
    }

    verifying_key_from_bytes(data)
}

/// Returns the hex text following `marker` on the first line containing it.
fn find_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let start = line.find(marker)? + marker.len();
        Some(line[start..].trim())
    })
}

fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| Error::InvalidKeyMaterial(format!("bad hex: {}", e)))
}
