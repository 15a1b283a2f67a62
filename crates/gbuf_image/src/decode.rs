//! Bit-depth dispatched pixel decoding

use gbuf_paint::Bitmap;

use crate::error::{ImageError, Result};

/// Largest accepted `width * height`
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Bytes-per-pixel layout of a raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDepth {
    /// One gray byte per pixel
    Gray,
    /// R, G, B bytes per pixel
    Rgb,
    /// R, G, B, A bytes per pixel
    Rgba,
    /// Any other declared depth; decoded as grayscale
    Unsupported(u32),
}

impl PixelDepth {
    pub fn from_code(depth: u32) -> Self {
        match depth {
            1 => Self::Gray,
            3 => Self::Rgb,
            4 => Self::Rgba,
            other => Self::Unsupported(other),
        }
    }
}

/// Convert raw payload bytes into an RGBA bitmap.
///
/// Missing source bytes read as zero. Alpha is forced opaque except for
/// [`PixelDepth::Rgba`], which is copied through.
pub fn decode_pixels(width: u32, height: u32, depth: PixelDepth, raw: &[u8]) -> Result<Bitmap> {
    let count = u64::from(width) * u64::from(height);
    if count > MAX_PIXELS {
        return Err(ImageError::TooLarge { width, height });
    }
    let count = count as usize;
    let byte = |i: usize| raw.get(i).copied().unwrap_or(0);

    let mut out = vec![0u8; count * 4];
    match depth {
        PixelDepth::Rgb => {
            for (i, px) in out.chunks_exact_mut(4).enumerate() {
                let src = i * 3;
                px.copy_from_slice(&[byte(src), byte(src + 1), byte(src + 2), 255]);
            }
        }
        PixelDepth::Rgba => {
            let n = raw.len().min(out.len());
            out[..n].copy_from_slice(&raw[..n]);
        }
        PixelDepth::Gray | PixelDepth::Unsupported(_) => {
            if let PixelDepth::Unsupported(code) = depth {
                tracing::warn!("Unsupported image depth {}, treating as grayscale", code);
            }
            for (i, px) in out.chunks_exact_mut(4).enumerate() {
                let g = byte(i);
                px.copy_from_slice(&[g, g, g, 255]);
            }
        }
    }

    Ok(Bitmap::from_rgba(width, height, out))
}
