//! gbuf Image
//!
//! Inline raster payloads carried by `drawimage` commands.
//!
//! # Features
//!
//! - Base64 payload decoding
//! - Depth-dispatched conversion to RGBA8 (gray, RGB, RGBA)
//! - Zero-fill of truncated buffers, grayscale fallback for unknown depths
//! - A frame-scoped cache keyed by image id, with pending decodes and
//!   deferred draws guarded against stale completions
//!
//! # Example
//!
//! ```
//! use gbuf_image::{decode_pixels, PixelDepth};
//!
//! let bitmap = decode_pixels(1, 1, PixelDepth::Gray, &[128]).unwrap();
//! assert_eq!(bitmap.pixel(0, 0), Some([128, 128, 128, 255]));
//! ```

mod cache;
mod decode;
mod error;
mod payload;

pub use cache::{
    Completion, DecodeTicket, DecodedImage, DeferredDraw, ImageCache, Lookup, PendingDecode,
};
pub use decode::{decode_pixels, PixelDepth, MAX_PIXELS};
pub use error::{ImageError, Result};
pub use payload::ImagePayload;
