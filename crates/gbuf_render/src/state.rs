//! Graphics state and the gsave/grestore stack

use gbuf_paint::{Color, Point, TextAlign};

use crate::viewport::Viewport;

/// Text anchor relative to the pen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Justification {
    #[default]
    Start,
    Middle,
    End,
}

impl Justification {
    /// Wire codes: -1 start, 0 middle, 1 end; anything else is middle
    pub fn from_code(code: f64) -> Self {
        match code {
            c if c == -1.0 => Self::Start,
            c if c == 1.0 => Self::End,
            _ => Self::Middle,
        }
    }

    pub fn align(&self) -> TextAlign {
        match self {
            Self::Start => TextAlign::Start,
            Self::Middle => TextAlign::Center,
            Self::End => TextAlign::End,
        }
    }
}

/// Text rotation, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Wire code lookup. The mapping is not monotonic: code 1 is 270 degrees
    /// and code 3 is 90 degrees. Unknown codes are 0 degrees.
    const CODES: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg270,
        Orientation::Deg180,
        Orientation::Deg90,
    ];

    pub fn from_code(code: f64) -> Self {
        if code.fract() != 0.0 || code < 0.0 {
            return Self::Deg0;
        }
        Self::CODES
            .get(code as usize)
            .copied()
            .unwrap_or(Self::Deg0)
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn radians(&self) -> f32 {
        (self.degrees() as f32).to_radians()
    }
}

/// Font family and device pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
}

impl Font {
    pub const DEFAULT_FAMILY: &'static str = "Helvetica";
    pub const DEFAULT_SIZE: f32 = 10.0;
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: Self::DEFAULT_FAMILY.to_string(),
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// The mutable drawing state threaded through every command
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub color: Color,
    pub background: Color,
    /// Cursor for `moveto`/`lineto`/`drawtext`, in device space
    pub pen: Point,
    pub font: Font,
    pub justification: Justification,
    pub orientation: Orientation,
    /// Device pixels
    pub line_width: f32,
    /// Frame-global; not part of saved snapshots
    pub viewport: Viewport,
}

impl GraphicsState {
    pub fn new(background: Color, viewport: Viewport) -> Self {
        Self {
            color: Color::BLACK,
            background,
            pen: Point::ZERO,
            font: Font::default(),
            justification: Justification::default(),
            orientation: Orientation::default(),
            line_width: 1.0,
            viewport,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            color: self.color,
            font: self.font.clone(),
            justification: self.justification,
            orientation: self.orientation,
            line_width: self.line_width,
        }
    }

    fn apply(&mut self, snapshot: Snapshot) {
        self.color = snapshot.color;
        self.font = snapshot.font;
        self.justification = snapshot.justification;
        self.orientation = snapshot.orientation;
        self.line_width = snapshot.line_width;
    }
}

/// The stack-scoped subset of [`GraphicsState`]
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    color: Color,
    font: Font,
    justification: Justification,
    orientation: Orientation,
    line_width: f32,
}

/// Current state plus saved snapshots
#[derive(Debug, Clone)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<Snapshot>,
}

impl GraphicsStack {
    pub fn new(background: Color, viewport: Viewport) -> Self {
        Self {
            current: GraphicsState::new(background, viewport),
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.snapshot());
    }

    /// Pop the last snapshot. Returns false (and changes nothing) when the
    /// stack is empty.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(snapshot) => {
                self.current.apply(snapshot);
                true
            }
            None => false,
        }
    }

    /// Defaults for a new frame; the viewport carries over
    pub fn reset(&mut self, background: Color) {
        let viewport = self.current.viewport;
        self.current = GraphicsState::new(background, viewport);
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::WindowBounds;
    use proptest::prelude::*;

    fn stack() -> GraphicsStack {
        GraphicsStack::new(Color::WHITE, Viewport::new(100, 100, true))
    }

    #[test]
    fn orientation_codes_are_non_monotonic() {
        let degrees: Vec<u32> = (0..4)
            .map(|c| Orientation::from_code(c as f64).degrees())
            .collect();
        assert_eq!(degrees, vec![0, 270, 180, 90]);
        assert_eq!(Orientation::from_code(4.0), Orientation::Deg0);
        assert_eq!(Orientation::from_code(-1.0), Orientation::Deg0);
        assert_eq!(Orientation::from_code(1.5), Orientation::Deg0);
    }

    #[test]
    fn justification_codes() {
        assert_eq!(Justification::from_code(-1.0), Justification::Start);
        assert_eq!(Justification::from_code(0.0), Justification::Middle);
        assert_eq!(Justification::from_code(1.0), Justification::End);
        assert_eq!(Justification::from_code(7.0), Justification::Middle);
    }

    #[test]
    fn restore_on_empty_stack_is_noop() {
        let mut s = stack();
        s.current_mut().color = Color::rgb(1, 2, 3);
        let before = s.current().clone();
        assert!(!s.restore());
        assert_eq!(s.current(), &before);
    }

    #[test]
    fn viewport_and_background_are_not_stack_scoped() {
        let mut s = stack();
        s.save();
        s.current_mut()
            .viewport
            .set_window(WindowBounds::new(0.0, 0.0, 10.0, 10.0));
        s.current_mut().background = Color::BLACK;
        s.current_mut().color = Color::WHITE;
        s.restore();

        assert_eq!(s.current().viewport.scale(), 10.0);
        assert_eq!(s.current().background, Color::BLACK);
        assert_eq!(s.current().color, Color::BLACK);
    }

    #[test]
    fn reset_keeps_viewport_only() {
        let mut s = stack();
        s.current_mut()
            .viewport
            .set_window(WindowBounds::new(0.0, 0.0, 50.0, 50.0));
        s.current_mut().font.size = 40.0;
        s.save();
        s.reset(Color::WHITE);

        assert_eq!(s.depth(), 0);
        assert_eq!(s.current().font, Font::default());
        assert_eq!(s.current().viewport.scale(), 2.0);
    }

    proptest! {
        #[test]
        fn nested_saves_fully_restore(n in 1usize..16, sizes in proptest::collection::vec(1.0f32..100.0, 16)) {
            let mut s = stack();
            let original = s.current().clone();
            for size in sizes.iter().take(n) {
                s.save();
                s.current_mut().font.size = *size;
                s.current_mut().justification = Justification::End;
                s.current_mut().orientation = Orientation::Deg90;
                s.current_mut().line_width = *size;
            }
            for _ in 0..n {
                prop_assert!(s.restore());
            }
            prop_assert_eq!(s.current(), &original);
            prop_assert!(!s.restore());
            prop_assert_eq!(s.current(), &original);
        }
    }
}
