pub mod export;
pub mod keys;
pub mod signer;

pub use keys::{
    generate_signing_key, load_signing_key, load_verifying_key, signing_key_from_bytes,
    verifying_key_from_bytes,
};
pub use p256::ecdsa::{SigningKey, VerifyingKey};
pub use signer::{sign, verify, RawSignature};
