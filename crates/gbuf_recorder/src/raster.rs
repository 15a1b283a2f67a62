//! Software rasterizer
//!
//! Pixels are sampled at their centers: a pixel is painted when
//! `(x + 0.5, y + 0.5)` lies inside the shape. Fills use the nonzero
//! winding rule and every write is source-over blended. Text is not
//! rasterized; each run is recorded as a [`TextRun`] in device space.

use std::ops::Range;

use gbuf_paint::{
    Bitmap, Circle, Color, DrawingSurface, Path, Point, Rect, StrokeStyle, TextStyle, Transform2D,
};

use crate::capture::CapturedFrame;

/// A text draw, resolved to device space
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub position: Point,
    /// Rotation in radians, clockwise on screen
    pub angle: f32,
    pub style: TextStyle,
}

/// RGBA8 raster surface
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transform: Transform2D,
    stack: Vec<Transform2D>,
    texts: Vec<TextRun>,
}

impl Framebuffer {
    /// A fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            transform: Transform2D::identity(),
            stack: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let px = &self.pixels[idx..idx + 4];
        Some(Color::new(px[0], px[1], px[2], px[3]))
    }

    /// Text runs still visible (not painted over by a full-surface fill)
    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    pub fn capture(&self) -> CapturedFrame {
        CapturedFrame::new(self.pixels.clone(), self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn put_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        blend(&mut self.pixels[idx..idx + 4], color.to_rgba8());
    }

    fn hline(&mut self, y: u32, xs: Range<u32>, color: Color) {
        let rgba = color.to_rgba8();
        for x in xs {
            let idx = self.index(x, y);
            blend(&mut self.pixels[idx..idx + 4], rgba);
        }
    }

    fn is_axis_aligned(&self) -> bool {
        self.transform.b == 0.0 && self.transform.c == 0.0
    }

    fn corners(&self, rect: Rect) -> [Point; 4] {
        let t = &self.transform;
        [
            t.apply(Point::new(rect.x, rect.y)),
            t.apply(Point::new(rect.x + rect.width, rect.y)),
            t.apply(Point::new(rect.x + rect.width, rect.y + rect.height)),
            t.apply(Point::new(rect.x, rect.y + rect.height)),
        ]
    }

    fn fill_device_rect(&mut self, rect: Rect, color: Color) {
        let rows = span(rect.y, rect.y + rect.height, self.height);
        let cols = span(rect.x, rect.x + rect.width, self.width);
        if color.a == 0xFF && rows == (0..self.height) && cols == (0..self.width) {
            self.texts.clear();
        }
        for y in rows {
            self.hline(y, cols.clone(), color);
        }
    }

    /// Nonzero-winding scanline fill over device-space rings
    fn fill_rings(&mut self, rings: &[Vec<Point>], color: Color) {
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in rings.iter().flatten() {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for y in span(min_y, max_y, self.height) {
            let yc = y as f32 + 0.5;
            crossings.clear();
            for ring in rings {
                let n = ring.len();
                for i in 0..n {
                    let a = ring[i];
                    let b = ring[(i + 1) % n];
                    if (a.y <= yc) != (b.y <= yc) {
                        let x = a.x + (yc - a.y) / (b.y - a.y) * (b.x - a.x);
                        let dir = if b.y > a.y { 1 } else { -1 };
                        crossings.push((x, dir));
                    }
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for i in 0..crossings.len().saturating_sub(1) {
                winding += crossings[i].1;
                if winding != 0 {
                    let xs = span(crossings[i].0, crossings[i + 1].0, self.width);
                    self.hline(y, xs, color);
                }
            }
        }
    }

    fn fill_disk(&mut self, center: Point, radius: f32, color: Color) {
        for y in span(center.y - radius, center.y + radius, self.height) {
            let dy = y as f32 + 0.5 - center.y;
            let half = (radius * radius - dy * dy).max(0.0).sqrt();
            let xs = span(center.x - half, center.x + half, self.width);
            self.hline(y, xs, color);
        }
    }

    /// Bresenham line between pixel cells, clipped to the buffer first
    fn thin_line(&mut self, a: Point, b: Point, color: Color) {
        let Some((a, b)) = clip_segment(a, b, self.width as f32, self.height as f32) else {
            return;
        };
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
        let (mut x, mut y) = (a.x.floor() as i64, a.y.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn thick_line(&mut self, a: Point, b: Point, width: f32, color: Color) {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if !(len > f32::EPSILON) {
            return;
        }
        let (nx, ny) = (-dy / len * width / 2.0, dx / len * width / 2.0);
        let quad = vec![
            Point::new(a.x + nx, a.y + ny),
            Point::new(b.x + nx, b.y + ny),
            Point::new(b.x - nx, b.y - ny),
            Point::new(a.x - nx, a.y - ny),
        ];
        self.fill_rings(&[quad], color);
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl DrawingSurface for Framebuffer {
    fn resize(&mut self, width: u32, height: u32) {
        tracing::trace!("Framebuffer resized to {}x{}", width, height);
        *self = Self::new(width, height);
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.transform = previous;
        }
    }

    fn transform(&mut self, transform: Transform2D) {
        self.transform = self.transform.then(&transform);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let corners = self.corners(rect);
        if self.is_axis_aligned() {
            self.fill_device_rect(Rect::from_points(corners[0], corners[2]), color);
        } else {
            self.fill_rings(&[corners.to_vec()], color);
        }
    }

    fn fill_circle(&mut self, circle: Circle, color: Color) {
        let center = self.transform.apply(circle.center);
        let radius = circle.radius * self.transform.length_scale();
        self.fill_disk(center, radius, color);
    }

    fn stroke_circle(&mut self, circle: Circle, style: &StrokeStyle) {
        let scale = self.transform.length_scale();
        let center = self.transform.apply(circle.center);
        let radius = circle.radius * scale;
        let half = (style.width * scale).max(1.0) / 2.0;
        let outer = radius + half;
        let inner = (radius - half).max(0.0);

        for y in span(center.y - outer, center.y + outer, self.height) {
            let dy = y as f32 + 0.5 - center.y;
            let out_half = (outer * outer - dy * dy).max(0.0).sqrt();
            if dy.abs() < inner {
                let in_half = (inner * inner - dy * dy).sqrt();
                let left = span(center.x - out_half, center.x - in_half, self.width);
                let right = span(center.x + in_half, center.x + out_half, self.width);
                self.hline(y, left, style.color);
                self.hline(y, right, style.color);
            } else {
                let xs = span(center.x - out_half, center.x + out_half, self.width);
                self.hline(y, xs, style.color);
            }
        }
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        let rings: Vec<Vec<Point>> = path
            .subpaths()
            .into_iter()
            .map(|sub| sub.points.iter().map(|p| self.transform.apply(*p)).collect())
            .collect();
        self.fill_rings(&rings, color);
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        let width = style.width * self.transform.length_scale();
        for sub in path.subpaths() {
            let points: Vec<Point> = sub.points.iter().map(|p| self.transform.apply(*p)).collect();
            let mut segments: Vec<(Point, Point)> =
                points.windows(2).map(|w| (w[0], w[1])).collect();
            if sub.closed && points.len() > 2 {
                segments.push((points[points.len() - 1], points[0]));
            }

            for (a, b) in segments {
                if width <= 1.0 {
                    self.thin_line(a, b, style.color);
                } else {
                    self.thick_line(a, b, width, style.color);
                }
            }
            if width > 2.0 {
                // Round joins
                for p in points.iter().skip(1).take(points.len().saturating_sub(2)) {
                    self.fill_disk(*p, width / 2.0, style.color);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        let t = &self.transform;
        self.texts.push(TextRun {
            text: text.to_string(),
            position: t.apply(position),
            angle: t.b.atan2(t.a),
            style: style.clone(),
        });
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) {
        if bitmap.is_empty() {
            return;
        }
        let corners = self.corners(dest);
        let (mut lo, mut hi) = (corners[0], corners[0]);
        for c in &corners[1..] {
            lo = Point::new(lo.x.min(c.x), lo.y.min(c.y));
            hi = Point::new(hi.x.max(c.x), hi.y.max(c.y));
        }
        let (w, h) = (hi.x - lo.x, hi.y - lo.y);
        if !(w > 0.0 && h > 0.0) {
            return;
        }

        let (bw, bh) = (bitmap.width(), bitmap.height());
        let cols = span(lo.x, hi.x, self.width);
        for y in span(lo.y, hi.y, self.height) {
            let v = (((y as f32 + 0.5 - lo.y) / h * bh as f32) as u32).min(bh - 1);
            for x in cols.clone() {
                let u = (((x as f32 + 0.5 - lo.x) / w * bw as f32) as u32).min(bw - 1);
                if let Some(src) = bitmap.pixel(u, v) {
                    let idx = self.index(x, y);
                    blend(&mut self.pixels[idx..idx + 4], src);
                }
            }
        }
    }
}

/// Pixel indices whose centers fall in `[lo, hi)`, clamped to `0..limit`.
/// A NaN bound covers nothing.
fn span(lo: f32, hi: f32, limit: u32) -> Range<u32> {
    if lo.is_nan() || hi.is_nan() {
        return 0..0;
    }
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(limit as f32);
    if !(start < end) {
        return 0..0;
    }
    start as u32..end as u32
}

/// Source-over blend of one straight-alpha RGBA8 pixel
fn blend(dst: &mut [u8], src: [u8; 4]) {
    let a = src[3] as u32;
    match a {
        0 => return,
        255 => {
            dst.copy_from_slice(&src);
            return;
        }
        _ => {}
    }
    let inv = 255 - a;
    for i in 0..3 {
        dst[i] = ((src[i] as u32 * a + dst[i] as u32 * inv + 127) / 255) as u8;
    }
    dst[3] = (a + (dst[3] as u32 * inv + 127) / 255) as u8;
}

/// Liang-Barsky clip against the buffer grown by one pixel
fn clip_segment(a: Point, b: Point, width: f32, height: f32) -> Option<(Point, Point)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-dx, a.x + 1.0),
        (dx, width + 1.0 - a.x),
        (-dy, a.y + 1.0),
        (dy, height + 1.0 - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        Point::new(a.x + t0 * dx, a.y + t0 * dy),
        Point::new(a.x + t1 * dx, a.y + t1 * dy),
    ))
}
