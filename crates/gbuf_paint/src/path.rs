//! Path building and representation

use smallvec::SmallVec;

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Close,
}

/// A 2D path composed of straight segments
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
}

/// One connected run of a path, as emitted by [`Path::subpaths`]
#[derive(Clone, Debug, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed polygon through `points`, in order
    pub fn polygon(points: &[Point]) -> Self {
        let mut builder = PathBuilder::new();
        for (i, p) in points.iter().enumerate() {
            builder = if i == 0 {
                builder.move_to(p.x, p.y)
            } else {
                builder.line_to(p.x, p.y)
            };
        }
        builder.close().build()
    }

    /// Single open segment
    pub fn line(from: Point, to: Point) -> Self {
        PathBuilder::new()
            .move_to(from.x, from.y)
            .line_to(to.x, to.y)
            .build()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Split into connected point runs. A `LineTo` without a preceding
    /// `MoveTo` starts at the origin.
    pub fn subpaths(&self) -> Vec<Subpath> {
        let mut out = Vec::new();
        let mut current: Option<Subpath> = None;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if let Some(done) = current.take() {
                        out.push(done);
                    }
                    current = Some(Subpath {
                        points: vec![p],
                        closed: false,
                    });
                }
                PathCommand::LineTo(p) => current
                    .get_or_insert_with(|| Subpath {
                        points: vec![Point::ZERO],
                        closed: false,
                    })
                    .points
                    .push(p),
                PathCommand::Close => {
                    if let Some(mut done) = current.take() {
                        done.closed = true;
                        out.push(done);
                    }
                }
            }
        }

        if let Some(done) = current {
            out.push(done);
        }
        out
    }
}

/// Builder for constructing paths
pub struct PathBuilder {
    path: Path,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            path: Path::new(),
        }
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        let point = Point::new(x, y);
        self.path.commands.push(PathCommand::MoveTo(point));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        let point = Point::new(x, y);
        self.path.commands.push(PathCommand::LineTo(point));
        self
    }

    pub fn close(mut self) -> Self {
        self.path.commands.push(PathCommand::Close);
        self
    }

    pub fn build(self) -> Path {
        self.path
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}
