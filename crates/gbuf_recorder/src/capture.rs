//! Frame capture for testing and screenshots.

use gbuf_paint::Color;

/// Snapshot of a framebuffer's pixels (RGBA8, row-major).
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel at (x, y) as RGBA, `None` outside the frame.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels exactly equal to `color`.
    pub fn count_color(&self, color: Color) -> usize {
        let rgba = color.to_rgba8();
        self.data.chunks_exact(4).filter(|px| *px == rgba).count()
    }

    /// Number of differing pixels; every pixel counts when sizes differ.
    pub fn diff_pixel_count(&self, other: &CapturedFrame) -> usize {
        if self.width != other.width || self.height != other.height {
            return self.pixel_count().max(other.pixel_count());
        }

        self.data
            .chunks(4)
            .zip(other.data.chunks(4))
            .filter(|(a, b)| a != b)
            .count()
    }

    pub fn is_identical_to(&self, other: &CapturedFrame) -> bool {
        self.width == other.width && self.height == other.height && self.data == other.data
    }

    pub fn diff_percentage(&self, other: &CapturedFrame) -> f32 {
        let total = self.pixel_count().max(1) as f32;
        let diff = self.diff_pixel_count(other) as f32;
        (diff / total) * 100.0
    }

    /// Encode as an RGBA PNG.
    #[cfg(feature = "png")]
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::BufWriter;

        let file = File::create(path)?;
        let writer = BufWriter::new(file);

        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(std::io::Error::other)?;
        writer
            .write_image_data(&self.data)
            .map_err(std::io::Error::other)?;

        Ok(())
    }
}

/// Outcome of a visual regression comparison.
#[derive(Clone, Debug)]
pub struct RegressionResult {
    pub passed: bool,
    pub diff_pixels: usize,
    pub diff_percentage: f32,
    pub tolerance: f32,
}

/// Compare two frames, passing when at most `tolerance_percent` of pixels differ.
pub fn compare_frames(
    actual: &CapturedFrame,
    expected: &CapturedFrame,
    tolerance_percent: f32,
) -> RegressionResult {
    let diff_pixels = actual.diff_pixel_count(expected);
    let diff_percentage = actual.diff_percentage(expected);

    RegressionResult {
        passed: diff_percentage <= tolerance_percent,
        diff_pixels,
        diff_percentage,
        tolerance: tolerance_percent,
    }
}
