//! Inline image payloads

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gbuf_paint::Bitmap;

use crate::decode::{decode_pixels, PixelDepth};
use crate::error::Result;

/// Depth assumed when a payload omits it
const DEFAULT_DEPTH: u32 = 3;

/// Raster data attached to a `drawimage` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel as sent on the wire; `0` means unspecified
    pub depth: u32,
    /// Base64-encoded raw pixel bytes
    pub data: String,
}

impl ImagePayload {
    pub fn new(width: u32, height: u32, depth: u32, data: impl Into<String>) -> Self {
        Self {
            width,
            height,
            depth,
            data: data.into(),
        }
    }

    /// Build a payload from raw bytes, encoding them as base64
    pub fn from_raw(width: u32, height: u32, depth: u32, raw: &[u8]) -> Self {
        Self::new(width, height, depth, STANDARD.encode(raw))
    }

    /// A payload only counts when it has dimensions and data
    pub fn is_present(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.data.is_empty()
    }

    pub fn pixel_depth(&self) -> PixelDepth {
        match self.depth {
            0 => PixelDepth::from_code(DEFAULT_DEPTH),
            code => PixelDepth::from_code(code),
        }
    }

    /// Decode the base64 text, ignoring embedded whitespace
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        let compact: String = self
            .data
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(STANDARD.decode(compact)?)
    }

    /// Decode to a bitmap. Undecodable base64 degrades to an all-zero
    /// source buffer.
    pub fn decode(&self) -> Result<Bitmap> {
        let raw = self.raw_bytes().unwrap_or_else(|err| {
            tracing::warn!("Image payload {}x{}: {}", self.width, self.height, err);
            Vec::new()
        });
        decode_pixels(self.width, self.height, self.pixel_depth(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_depth_defaults_to_rgb() {
        let p = ImagePayload::from_raw(1, 1, 0, &[9, 8, 7]);
        assert_eq!(p.pixel_depth(), PixelDepth::Rgb);
        assert_eq!(p.decode().unwrap().pixel(0, 0), Some([9, 8, 7, 255]));
    }

    #[test]
    fn presence_requires_all_fields() {
        assert!(ImagePayload::new(2, 2, 1, "AAAA").is_present());
        assert!(!ImagePayload::new(0, 2, 1, "AAAA").is_present());
        assert!(!ImagePayload::new(2, 2, 1, "").is_present());
    }

    #[test]
    fn bad_base64_zero_fills() {
        let p = ImagePayload::new(1, 1, 3, "!!not base64!!");
        assert!(p.raw_bytes().is_err());
        assert_eq!(p.decode().unwrap().pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn whitespace_in_data_is_ignored() {
        let p = ImagePayload::new(1, 1, 1, "gA==\n");
        assert_eq!(p.raw_bytes().unwrap(), vec![128]);
    }
}
