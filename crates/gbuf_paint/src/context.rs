//! Paint context - a recording drawing surface

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::path::{Path, Point};
use crate::primitives::*;
use crate::surface::{DrawingSurface, StrokeStyle, TextStyle, Transform2D};

/// A primitive recorded by [`PaintContext`]
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    Resize {
        width: u32,
        height: u32,
    },
    Save,
    Restore,
    Transform {
        transform: Transform2D,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillCircle {
        circle: Circle,
        color: Color,
    },
    StrokeCircle {
        circle: Circle,
        style: StrokeStyle,
    },
    FillPath {
        path: Path,
        color: Color,
    },
    StrokePath {
        path: Path,
        style: StrokeStyle,
    },
    DrawText {
        text: String,
        position: Point,
        style: TextStyle,
        /// Surface transform in effect when the text was drawn
        transform: Transform2D,
    },
    DrawBitmap {
        bitmap: Bitmap,
        dest: Rect,
    },
}

/// A [`DrawingSurface`] that records every call instead of rasterizing.
pub struct PaintContext {
    width: u32,
    height: u32,
    commands: Vec<PaintCommand>,
    current_transform: Transform2D,
    transform_stack: Vec<Transform2D>,
}

impl PaintContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            current_transform: Transform2D::identity(),
            transform_stack: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    pub fn current_transform(&self) -> Transform2D {
        self.current_transform
    }

    pub fn save_depth(&self) -> usize {
        self.transform_stack.len()
    }

    /// Recorded text runs, in draw order
    pub fn texts(&self) -> impl Iterator<Item = (&str, Point, &TextStyle)> {
        self.commands.iter().filter_map(|c| match c {
            PaintCommand::DrawText {
                text,
                position,
                style,
                ..
            } => Some((text.as_str(), *position, style)),
            _ => None,
        })
    }
}

impl DrawingSurface for PaintContext {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.current_transform = Transform2D::identity();
        self.transform_stack.clear();
        self.commands.push(PaintCommand::Resize { width, height });
    }

    fn save(&mut self) {
        self.transform_stack.push(self.current_transform);
        self.commands.push(PaintCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.transform_stack.pop() {
            self.current_transform = previous;
            self.commands.push(PaintCommand::Restore);
        }
    }

    fn transform(&mut self, transform: Transform2D) {
        self.current_transform = self.current_transform.then(&transform);
        self.commands.push(PaintCommand::Transform { transform });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(PaintCommand::FillRect { rect, color });
    }

    fn fill_circle(&mut self, circle: Circle, color: Color) {
        self.commands.push(PaintCommand::FillCircle { circle, color });
    }

    fn stroke_circle(&mut self, circle: Circle, style: &StrokeStyle) {
        self.commands.push(PaintCommand::StrokeCircle {
            circle,
            style: *style,
        });
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        self.commands.push(PaintCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        self.commands.push(PaintCommand::StrokePath {
            path: path.clone(),
            style: *style,
        });
    }

    fn fill_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        self.commands.push(PaintCommand::DrawText {
            text: text.to_string(),
            position,
            style: style.clone(),
            transform: self.current_transform,
        });
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) {
        self.commands.push(PaintCommand::DrawBitmap {
            bitmap: bitmap.clone(),
            dest,
        });
    }
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new(640, 480)
    }
}
