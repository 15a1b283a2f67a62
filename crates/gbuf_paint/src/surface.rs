//! The drawing capability the renderer targets

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::path::{Path, Point};
use crate::primitives::{Circle, Rect};

/// 2D affine transform
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`, the same layout as
/// the HTML canvas `setTransform`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            e: x,
            f: y,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Rotation by `angle` radians, clockwise on a y-down surface
    pub fn rotate(angle: f32) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Composite that applies `other` first, then `self`
    /// (canvas post-multiplication order).
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Uniform length scale (square root of the determinant magnitude)
    pub fn length_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Stroke style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Horizontal anchoring of a text run relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

/// Vertical anchoring of a text run relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Alphabetic,
    Bottom,
}

/// Everything needed to place a text run
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            size: 10.0,
            color: Color::BLACK,
            align: TextAlign::Start,
            baseline: TextBaseline::Middle,
        }
    }
}

/// A device surface the renderer draws onto.
///
/// Coordinates are device pixels, y-down, before the current transform is
/// applied. Implementations rasterize however they like; the renderer only
/// decides what is drawn and with which attributes.
pub trait DrawingSurface {
    /// Change the surface size in device pixels, discarding content
    fn resize(&mut self, width: u32, height: u32);

    /// Push the current transform
    fn save(&mut self);

    /// Pop the last saved transform. No-op when nothing is saved.
    fn restore(&mut self);

    /// Post-multiply `transform` onto the current transform
    fn transform(&mut self, transform: Transform2D);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, circle: Circle, color: Color);

    fn stroke_circle(&mut self, circle: Circle, style: &StrokeStyle);

    fn fill_path(&mut self, path: &Path, color: Color);

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle);

    fn fill_text(&mut self, text: &str, position: Point, style: &TextStyle);

    /// Stretch `bitmap` into `dest`
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect);
}
