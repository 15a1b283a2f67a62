//! The command vocabulary

use gbuf_image::ImagePayload;
use gbuf_paint::Color;
use smallvec::SmallVec;

use crate::color::color_from_token;
use crate::error::{CommandError, Result};
use crate::state::{Justification, Orientation};
use crate::viewport::WindowBounds;

/// One positional command argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Number(f64),
    Text(String),
}

impl Arg {
    /// Finite numeric value; numeric strings are accepted, but `NaN`,
    /// infinities and out-of-range literals are not
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Arg::Number(n) => *n,
            Arg::Text(s) => s.trim().parse().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Textual value; numbers print without a trailing `.0`
    pub fn to_text(&self) -> String {
        match self {
            Arg::Number(n) => n.to_string(),
            Arg::Text(s) => s.clone(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Arg::Number(n) => *n != 0.0 && !n.is_nan(),
            Arg::Text(s) => !s.is_empty(),
        }
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Number(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Number(f64::from(n))
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

/// A validated command, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetWindow(WindowBounds),
    SetColor(Color),
    SetBackground(Color),
    SetJustification(Justification),
    SetOrientation(Orientation),
    SetFont {
        family: String,
        /// Logical size, before scaling
        size: f64,
    },
    /// Hundredths of a logical unit
    SetLineWidth(f64),
    Save,
    Restore,
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        filled: bool,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    FilledRect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Polygon {
        points: SmallVec<[(f64, f64); 8]>,
        filled: bool,
    },
    DrawText(String),
    DrawImage {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        id: String,
        payload: Option<ImagePayload>,
    },
    /// Accepted and ignored
    SetClipRegion,
}

/// Positional argument access with command-scoped errors
struct Args<'a> {
    name: &'a str,
    args: &'a [Arg],
}

impl<'a> Args<'a> {
    fn get(&self, index: usize) -> Result<&'a Arg> {
        self.args.get(index).ok_or_else(|| CommandError::MissingArgument {
            command: self.name.to_string(),
            index,
        })
    }

    fn number(&self, index: usize) -> Result<f64> {
        let arg = self.get(index)?;
        arg.as_number()
            .ok_or_else(|| CommandError::BadArgument {
                command: self.name.to_string(),
                index,
                found: arg.to_text(),
            })
    }

    fn numbers<const N: usize>(&self) -> Result<[f64; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Ok(out)
    }
}

impl Command {
    /// Validate a wire command. Unknown names yield `Ok(None)`.
    pub fn parse(name: &str, args: &[Arg], payload: Option<&ImagePayload>) -> Result<Option<Self>> {
        let a = Args { name, args };
        let command = match name {
            "setwindow" => {
                let [llx, lly, urx, ury] = a.numbers()?;
                Command::SetWindow(WindowBounds::new(llx, lly, urx, ury))
            }
            "setcolor" => Command::SetColor(color_from_token(a.number(0)?)),
            "setbackground" => Command::SetBackground(color_from_token(a.number(0)?)),
            "setjust" => Command::SetJustification(Justification::from_code(a.number(0)?)),
            "setorientation" => Command::SetOrientation(Orientation::from_code(a.number(0)?)),
            "setfont" => {
                let family = args
                    .first()
                    .map(Arg::to_text)
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| crate::state::Font::DEFAULT_FAMILY.to_string());
                let size = args
                    .get(1)
                    .and_then(Arg::as_number)
                    .filter(|s| *s != 0.0 && s.is_finite())
                    .unwrap_or(f64::from(crate::state::Font::DEFAULT_SIZE));
                Command::SetFont { family, size }
            }
            "setlwidth" => Command::SetLineWidth(a.number(0)?),
            "gsave" => Command::Save,
            "grestore" => Command::Restore,
            "circle" | "fcircle" => {
                let [x, y, radius] = a.numbers()?;
                let filled = name == "fcircle" || args.get(3).is_some_and(Arg::is_truthy);
                Command::Circle {
                    x,
                    y,
                    radius,
                    filled,
                }
            }
            "line" => {
                let [x0, y0, x1, y1] = a.numbers()?;
                Command::Line { x0, y0, x1, y1 }
            }
            "moveto" => {
                let [x, y] = a.numbers()?;
                Command::MoveTo { x, y }
            }
            "lineto" => {
                let [x, y] = a.numbers()?;
                Command::LineTo { x, y }
            }
            "frect" | "filledrect" => {
                let [x0, y0, x1, y1] = a.numbers()?;
                Command::FilledRect { x0, y0, x1, y1 }
            }
            "poly" | "fpoly" => {
                if args.len() < 6 || args.len() % 2 != 0 {
                    return Err(CommandError::InvalidPolygon {
                        command: name.to_string(),
                        count: args.len(),
                    });
                }
                let points = (0..args.len())
                    .step_by(2)
                    .map(|i| Ok((a.number(i)?, a.number(i + 1)?)))
                    .collect::<Result<_>>()?;
                Command::Polygon {
                    points,
                    filled: name == "fpoly",
                }
            }
            "drawtext" => {
                let text = a.get(0)?;
                let text = if text.is_truthy() {
                    text.to_text()
                } else {
                    String::new()
                };
                Command::DrawText(text)
            }
            "drawimage" => {
                let [x0, y0, x1, y1] = a.numbers()?;
                let id = a.get(4)?.to_text();
                Command::DrawImage {
                    x0,
                    y0,
                    x1,
                    y1,
                    id,
                    payload: payload.filter(|p| p.is_present()).cloned(),
                }
            }
            "setclipregion" => Command::SetClipRegion,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, args: Vec<Arg>) -> Result<Option<Command>> {
        Command::parse(name, &args, None)
    }

    #[test]
    fn unknown_names_are_ignored() {
        assert!(matches!(parse("sparkle", vec![1.into()]), Ok(None)));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let cmd = parse("moveto", vec!["3".into(), Arg::Number(4.0)]).unwrap();
        assert_eq!(cmd, Some(Command::MoveTo { x: 3.0, y: 4.0 }));
    }

    #[test]
    fn missing_and_bad_arguments_error() {
        assert!(matches!(
            parse("line", vec![1.into(), 2.into(), 3.into()]),
            Err(CommandError::MissingArgument { index: 3, .. })
        ));
        assert!(matches!(
            parse("setcolor", vec!["red".into()]),
            Err(CommandError::BadArgument { index: 0, .. })
        ));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for bad in ["NaN", "inf", "-infinity", "1e400"] {
            assert!(matches!(
                parse("fcircle", vec![bad.into(), 50.into(), 5.into()]),
                Err(CommandError::BadArgument { index: 0, .. })
            ));
        }
        assert!(matches!(
            parse("frect", vec![0.into(), Arg::Number(f64::INFINITY), 1.into(), 1.into()]),
            Err(CommandError::BadArgument { index: 1, .. })
        ));
    }

    #[test]
    fn circle_fills_on_truthy_fourth_arg() {
        let cmd = parse("circle", vec![1.into(), 2.into(), 3.into(), 1.into()]).unwrap();
        assert!(matches!(cmd, Some(Command::Circle { filled: true, .. })));
        let cmd = parse("circle", vec![1.into(), 2.into(), 3.into()]).unwrap();
        assert!(matches!(cmd, Some(Command::Circle { filled: false, .. })));
    }

    #[test]
    fn polygon_needs_even_args_of_at_least_six() {
        let five: Vec<Arg> = (0..5).map(|i: i32| Arg::from(i)).collect();
        assert!(matches!(
            parse("poly", five),
            Err(CommandError::InvalidPolygon { count: 5, .. })
        ));
        let six: Vec<Arg> = (0..6).map(|i: i32| Arg::from(i)).collect();
        match parse("fpoly", six).unwrap() {
            Some(Command::Polygon { points, filled }) => {
                assert!(filled);
                assert_eq!(points.as_slice(), &[(0.0, 1.0), (2.0, 3.0), (4.0, 5.0)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn setfont_defaults() {
        let cmd = parse("setfont", vec![]).unwrap();
        assert_eq!(
            cmd,
            Some(Command::SetFont {
                family: "Helvetica".to_string(),
                size: 10.0
            })
        );
    }

    #[test]
    fn drawtext_stringifies_numbers() {
        assert_eq!(
            parse("drawtext", vec![Arg::Number(42.0)]).unwrap(),
            Some(Command::DrawText("42".to_string()))
        );
        assert_eq!(
            parse("drawtext", vec![Arg::Number(0.0)]).unwrap(),
            Some(Command::DrawText(String::new()))
        );
    }

    #[test]
    fn drawimage_drops_empty_payloads() {
        let args: Vec<Arg> = vec![0.into(), 0.into(), 1.into(), 1.into(), 9.into()];
        let empty = ImagePayload::new(0, 0, 3, "");
        match Command::parse("drawimage", &args, Some(&empty)).unwrap() {
            Some(Command::DrawImage { id, payload, .. }) => {
                assert_eq!(id, "9");
                assert!(payload.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
