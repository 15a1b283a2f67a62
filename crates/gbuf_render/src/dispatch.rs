//! Command execution against a surface

use gbuf_image::{DeferredDraw, ImageCache, ImagePayload, Lookup, PendingDecode};
use gbuf_paint::{
    Circle, DrawingSurface, Path, Point, StrokeStyle, TextBaseline, TextStyle, Transform2D,
};

use crate::command::Command;
use crate::error::{CommandError, Result};
use crate::state::{Font, GraphicsStack};

/// Everything one command may touch, borrowed from the renderer for the
/// duration of a frame.
pub(crate) struct Dispatcher<'a, S: DrawingSurface> {
    pub surface: &'a mut S,
    pub state: &'a mut GraphicsStack,
    pub cache: &'a mut ImageCache,
    pub pending: &'a mut Vec<PendingDecode>,
    pub deferred_decode: bool,
}

impl<S: DrawingSurface> Dispatcher<'_, S> {
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::SetWindow(bounds) => {
                self.state.current_mut().viewport.set_window(*bounds);
            }
            Command::SetColor(color) => self.state.current_mut().color = *color,
            Command::SetBackground(color) => {
                let state = self.state.current_mut();
                state.background = *color;
                let full = state.viewport.device_rect();
                self.surface.fill_rect(full, *color);
            }
            Command::SetJustification(j) => self.state.current_mut().justification = *j,
            Command::SetOrientation(o) => self.state.current_mut().orientation = *o,
            Command::SetFont { family, size } => {
                let state = self.state.current_mut();
                state.font = Font {
                    family: family.clone(),
                    size: state.viewport.transform_length(*size) as f32,
                };
            }
            Command::SetLineWidth(hundredths) => {
                let state = self.state.current_mut();
                let width = state.viewport.transform_length(hundredths / 100.0);
                state.line_width = width.max(1.0) as f32;
            }
            Command::Save => self.state.save(),
            Command::Restore => {
                if !self.state.restore() {
                    tracing::trace!("grestore with empty stack");
                }
            }
            Command::Circle {
                x,
                y,
                radius,
                filled,
            } => {
                let stroke = self.stroke();
                let state = self.state.current();
                let circle = Circle::new(
                    state.viewport.to_device(*x, *y),
                    state.viewport.transform_length(*radius) as f32,
                );
                if *filled {
                    self.surface.fill_circle(circle, state.color);
                } else {
                    self.surface.stroke_circle(circle, &stroke);
                }
            }
            Command::Line { x0, y0, x1, y1 } => {
                let stroke = self.stroke();
                let vp = &self.state.current().viewport;
                let path = Path::line(vp.to_device(*x0, *y0), vp.to_device(*x1, *y1));
                self.surface.stroke_path(&path, &stroke);
            }
            Command::MoveTo { x, y } => {
                let state = self.state.current_mut();
                state.pen = state.viewport.to_device(*x, *y);
            }
            Command::LineTo { x, y } => {
                let stroke = self.stroke();
                let state = self.state.current_mut();
                let to = state.viewport.to_device(*x, *y);
                let path = Path::line(state.pen, to);
                state.pen = to;
                self.surface.stroke_path(&path, &stroke);
            }
            Command::FilledRect { x0, y0, x1, y1 } => {
                let state = self.state.current();
                let rect = state.viewport.rect_to_device(*x0, *y0, *x1, *y1);
                self.surface.fill_rect(rect, state.color);
            }
            Command::Polygon { points, filled } => {
                let stroke = self.stroke();
                let state = self.state.current();
                let device: Vec<Point> = points
                    .iter()
                    .map(|(x, y)| state.viewport.to_device(*x, *y))
                    .collect();
                let path = Path::polygon(&device);
                if *filled {
                    self.surface.fill_path(&path, state.color);
                } else {
                    self.surface.stroke_path(&path, &stroke);
                }
            }
            Command::DrawText(text) => self.draw_text(text),
            Command::DrawImage {
                x0,
                y0,
                x1,
                y1,
                id,
                payload,
            } => {
                let dest = self.state.current().viewport.rect_to_device(*x0, *y0, *x1, *y1);
                self.draw_image(id, payload.as_ref(), DeferredDraw { dest })?;
            }
            Command::SetClipRegion => {}
        }
        Ok(())
    }

    fn stroke(&self) -> StrokeStyle {
        let state = self.state.current();
        StrokeStyle {
            color: state.color,
            width: state.line_width,
        }
    }

    fn draw_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let state = self.state.current();
        let style = TextStyle {
            family: state.font.family.clone(),
            size: state.font.size,
            color: state.color,
            align: state.justification.align(),
            baseline: TextBaseline::Middle,
        };
        let anchor = state.pen;
        let angle = state.orientation.radians();

        if angle == 0.0 {
            self.surface.fill_text(text, anchor, &style);
        } else {
            self.surface.save();
            self.surface.transform(Transform2D::translate(anchor.x, anchor.y));
            self.surface.transform(Transform2D::rotate(angle));
            self.surface.fill_text(text, Point::ZERO, &style);
            self.surface.restore();
        }
    }

    fn draw_image(
        &mut self,
        id: &str,
        payload: Option<&ImagePayload>,
        draw: DeferredDraw,
    ) -> Result<()> {
        if let Some(payload) = payload {
            if !self.cache.contains(id) {
                self.cache_payload(id, payload)?;
            }
        }

        match self.cache.lookup(id) {
            Lookup::Ready(bitmap) => self.surface.draw_bitmap(&bitmap, draw.dest),
            Lookup::Pending => {
                self.cache.defer(id, draw);
                tracing::trace!("Image {} still decoding, draw deferred", id);
            }
            Lookup::Missing => tracing::debug!("Image not found in cache: {}", id),
        }
        Ok(())
    }

    fn cache_payload(&mut self, id: &str, payload: &ImagePayload) -> Result<()> {
        if self.deferred_decode {
            let ticket = self.cache.insert_pending(id);
            self.pending.push(PendingDecode {
                id: id.to_string(),
                ticket,
                payload: payload.clone(),
            });
            return Ok(());
        }

        let bitmap = payload.decode().map_err(|source| CommandError::Image {
            id: id.to_string(),
            source,
        })?;
        self.cache.insert_ready(id, bitmap);
        Ok(())
    }
}
