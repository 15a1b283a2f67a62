//! gbuf Paint Surface
//!
//! The drawing capability consumed by the graphics command renderer.
//!
//! # Features
//!
//! - Shape primitives (rect, circle, polygon paths)
//! - Fills and strokes with solid colors
//! - Anchored, rotatable text runs
//! - RGBA bitmap blits
//! - Save/restore of the surface transform
//!
//! The renderer decides *what* to draw; a [`DrawingSurface`] decides how
//! pixels are produced. [`PaintContext`] is a recording surface that keeps
//! every primitive as a [`PaintCommand`].

pub mod bitmap;
pub mod color;
pub mod context;
pub mod path;
pub mod primitives;
pub mod surface;

pub use bitmap::Bitmap;
pub use color::Color;
pub use context::{PaintCommand, PaintContext};
pub use path::{Path, PathBuilder, PathCommand, Point};
pub use primitives::*;
pub use surface::{DrawingSurface, StrokeStyle, TextAlign, TextBaseline, TextStyle, Transform2D};
