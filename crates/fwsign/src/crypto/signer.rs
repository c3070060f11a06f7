//! Deterministic ECDSA P-256 / SHA-256 signatures.
//!
//! Nonces are derived per RFC 6979 from the key and the message digest, so
//! signing the same bytes with the same key always yields the same signature.
//! Image rebuilds are therefore reproducible byte for byte.
//!
//! Signatures are the raw 64-byte `r‖s` concatenation with no ASN.1 wrapping.

use crate::image::SIGNATURE_SIZE;
use p256::ecdsa::signature::{DigestSigner, DigestVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// A raw `r‖s` signature as stored in an image slot.
pub type RawSignature = [u8; SIGNATURE_SIZE];

/// Sign `message` with `key`.
pub fn sign(key: &SigningKey, message: &[u8]) -> RawSignature {
    let signature: Signature = key.sign_digest(Sha256::new_with_prefix(message));
    let mut out = [0u8; SIGNATURE_SIZE];
    out.copy_from_slice(&signature.to_bytes());
    out
}

/// Check `signature` over `message` against `key`.
///
/// Malformed signatures (including the all-zero placeholder) verify as false.
pub fn verify(key: &VerifyingKey, message: &[u8], signature: &RawSignature) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify_digest(Sha256::new_with_prefix(message), &signature)
        .is_ok()
}
