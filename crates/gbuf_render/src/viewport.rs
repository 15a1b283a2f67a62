//! Logical window to device pixel mapping
//!
//! The producer draws in a y-up window set by `setwindow`; the surface is
//! y-down. A single uniform scale, the larger of the two axis ratios, keeps
//! shapes and text undistorted.

use gbuf_paint::{Point, Rect};
use serde::Serialize;

/// Logical drawing window: lower-left and upper-right corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowBounds {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl WindowBounds {
    pub const fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// Logical size of the producer's window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceDimensions {
    pub width: f64,
    pub height: f64,
}

/// Frame-global coordinate transform
///
/// Logical coordinates are measured from the window's lower-left corner:
/// `x' = (x - llx) * scale`, `y' = H - (y - lly) * scale`. A producer
/// renderer that maps plain `x * scale` draws the same picture only when
/// `llx` and `lly` are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    device_width: u32,
    device_height: u32,
    window: Option<WindowBounds>,
    auto_scale: bool,
    scale: f64,
}

impl Viewport {
    /// Identity mapping (scale 1, no window) onto a device surface
    pub fn new(device_width: u32, device_height: u32, auto_scale: bool) -> Self {
        Self {
            device_width,
            device_height,
            window: None,
            auto_scale,
            scale: 1.0,
        }
    }

    /// Compute the uniform scale for `window` on a `width` x `height` device.
    ///
    /// Degenerate or non-finite windows fall back to 1.0.
    pub fn scale_for(window: &WindowBounds, width: u32, height: u32) -> f64 {
        let (w, h) = (window.width(), window.height());
        if w == 0.0 || h == 0.0 {
            return 1.0;
        }
        let scale = (f64::from(width) / w).max(f64::from(height) / h);
        if scale.is_finite() {
            scale
        } else {
            1.0
        }
    }

    /// Install a new window; affects subsequent transforms only
    pub fn set_window(&mut self, window: WindowBounds) {
        self.window = Some(window);
        self.recompute();
    }

    /// Change the device size, rescaling the current window
    pub fn resize(&mut self, device_width: u32, device_height: u32) {
        self.device_width = device_width;
        self.device_height = device_height;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.scale = match (&self.window, self.auto_scale) {
            (Some(window), true) => Self::scale_for(window, self.device_width, self.device_height),
            _ => 1.0,
        };
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn window(&self) -> Option<WindowBounds> {
        self.window
    }

    pub fn device_width(&self) -> u32 {
        self.device_width
    }

    pub fn device_height(&self) -> u32 {
        self.device_height
    }

    pub fn source_dimensions(&self) -> Option<SourceDimensions> {
        self.window.map(|w| SourceDimensions {
            width: w.width(),
            height: w.height(),
        })
    }

    fn origin(&self) -> (f64, f64) {
        self.window.map_or((0.0, 0.0), |w| (w.llx, w.lly))
    }

    pub fn transform_x(&self, x: f64) -> f64 {
        (x - self.origin().0) * self.scale
    }

    pub fn transform_y(&self, y: f64) -> f64 {
        f64::from(self.device_height) - (y - self.origin().1) * self.scale
    }

    /// Scale a logical length (radius, width) to device pixels
    pub fn transform_length(&self, length: f64) -> f64 {
        length * self.scale
    }

    pub fn to_device(&self, x: f64, y: f64) -> Point {
        Point::new(self.transform_x(x) as f32, self.transform_y(y) as f32)
    }

    /// Normalized device rectangle spanning two logical corners
    pub fn rect_to_device(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::from_points(self.to_device(x0, y0), self.to_device(x1, y1))
    }

    /// The whole device surface
    pub fn device_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.device_width as f32, self.device_height as f32)
    }
}
