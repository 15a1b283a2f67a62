//! Decoded RGBA pixel buffers

/// An RGBA8 bitmap with row stride `width * 4`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap an RGBA buffer. Short buffers are zero-extended and long ones
    /// truncated to `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, mut pixels: Vec<u8>) -> Self {
        pixels.resize(Self::byte_len(width, height), 0);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Fully transparent bitmap
    pub fn blank(width: u32, height: u32) -> Self {
        Self::from_rgba(width, height, Vec::new())
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at (x, y) as RGBA
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.stride() + x as usize * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }
}
