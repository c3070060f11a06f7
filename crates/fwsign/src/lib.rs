pub mod builder;
pub mod crypto;
pub mod error;
pub mod image;
pub mod integrity;
pub mod manifest;

pub use builder::{build_image, countersign_image, decode_header, verify_file, FwSign};
pub use error::Error;
pub use image::{inspect, FirmwareImage, ImageReport, ImageState, VerificationReport, Version};
pub use manifest::Manifest;

pub type Result<T> = std::result::Result<T, Error>;
