//! Firmware image container format.
//!
//! ## Structure
//!
//! ```text
//! ┌────────────────────────────────────┐ 0
//! │ Header Block (64 bytes)            │
//! │  - filesize (4, LE)                │
//! │  - magic (4, as given)             │
//! │  - firmware version (4, LE)        │
//! │  - hardware version (4, LE)        │
//! │  - crc32 of payload (4, LE)        │
//! │  - zero padding (44)               │
//! ├────────────────────────────────────┤ 64
//! │ Header Signature (64 bytes, r‖s)   │
//! ├────────────────────────────────────┤ 128
//! │ Primary Signature (64 bytes, r‖s)  │
//! ├────────────────────────────────────┤ 192
//! │ Secondary Signature (64 bytes)     │
//! │  all-zero until counter-signed     │
//! ├────────────────────────────────────┤ 256
//! │ Payload (filesize bytes)           │
//! └────────────────────────────────────┘
//! ```

pub mod header;
pub mod inspect;
pub mod layout;
pub mod verify;
pub mod version;

pub use header::HeaderBlock;
pub use inspect::{inspect, ImageReport};
pub use layout::{FirmwareImage, ImageState, SignatureSlot};
pub use verify::{verify_image, SignatureStatus, VerificationReport};
pub use version::Version;

use std::ops::Range;

/// Size of the header block in bytes
pub const HEADER_SIZE: usize = 64;

/// Size of a raw ECDSA P-256 signature (r‖s)
pub const SIGNATURE_SIZE: usize = 64;

/// Header block
pub const HEADER_RANGE: Range<usize> = 0..HEADER_SIZE;

/// Signature over the header block, made with the first key
pub const HEADER_SIGNATURE_RANGE: Range<usize> = HEADER_SIZE..HEADER_SIZE + SIGNATURE_SIZE;

/// Signature over the payload, made with the first key
pub const PRIMARY_SIGNATURE_RANGE: Range<usize> =
    HEADER_SIGNATURE_RANGE.end..HEADER_SIGNATURE_RANGE.end + SIGNATURE_SIZE;

/// Signature over the payload, made with the second key
pub const SECONDARY_SIGNATURE_RANGE: Range<usize> =
    PRIMARY_SIGNATURE_RANGE.end..PRIMARY_SIGNATURE_RANGE.end + SIGNATURE_SIZE;

/// Fixed prefix preceding the payload
pub const PREFIX_SIZE: usize = SECONDARY_SIGNATURE_RANGE.end;
