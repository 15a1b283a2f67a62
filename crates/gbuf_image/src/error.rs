//! Image error types

use thiserror::Error;

/// Errors raised while turning a payload into a bitmap
#[derive(Error, Debug)]
pub enum ImageError {
    /// Payload data is not valid base64
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Declared dimensions exceed the decoder limit
    #[error("image dimensions {width}x{height} exceed the pixel limit")]
    TooLarge { width: u32, height: u32 },
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;
