//! gbuf Recorder
//!
//! Headless rendering for graphics frames:
//!
//! - [`Framebuffer`]: an RGBA software rasterizer implementing
//!   [`DrawingSurface`](gbuf_paint::DrawingSurface)
//! - [`CapturedFrame`]: a pixel snapshot with inspection and diff helpers
//! - PNG export behind the `png` feature

pub mod capture;
pub mod raster;

pub use capture::{compare_frames, CapturedFrame, RegressionResult};
pub use raster::{Framebuffer, TextRun};
