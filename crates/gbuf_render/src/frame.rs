//! Frames as they arrive on the wire
//!
//! ```json
//! { "commands": [ { "cmd": "drawimage", "args": [0, 0, 10, 10, 3],
//!                   "image_data": { "width": 2, "height": 2, "depth": 1, "data": "AAAAAA==" } } ] }
//! ```
//!
//! Conversion is lenient per element: one odd entry never rejects the
//! whole frame.

use gbuf_image::ImagePayload;
use serde_json::{Map, Value};

use crate::command::{Arg, Command};
use crate::error::{FrameError, Result};

/// A command exactly as received: name, positional args, optional image
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommand {
    pub name: String,
    pub args: Vec<Arg>,
    pub image: Option<ImagePayload>,
}

impl RawCommand {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Validate into a [`Command`]; `Ok(None)` for unknown names
    pub fn parse(&self) -> Result<Option<Command>> {
        Command::parse(&self.name, &self.args, self.image.as_ref())
    }

    fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let name = obj.get("cmd")?.as_str()?;
        let args = obj.get("args")?.as_array()?;
        Some(Self {
            name: name.to_string(),
            args: args.iter().map(arg_from_json).collect(),
            image: obj
                .get("image_data")
                .and_then(Value::as_object)
                .map(payload_from_json),
        })
    }
}

/// One complete redraw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<RawCommand>,
}

impl Frame {
    pub fn new(commands: Vec<RawCommand>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Parse a `{ "commands": [...] }` document
    pub fn from_json(text: &str) -> std::result::Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Convert an already-parsed document. Elements without a string `cmd`
    /// and an array `args` are skipped.
    pub fn from_value(value: &Value) -> std::result::Result<Self, FrameError> {
        let entries = value
            .get("commands")
            .and_then(Value::as_array)
            .ok_or(FrameError::MissingCommands)?;

        let commands: Vec<RawCommand> = entries.iter().filter_map(RawCommand::from_json).collect();
        if commands.len() != entries.len() {
            tracing::debug!(
                "Skipped {} frame entries without cmd/args",
                entries.len() - commands.len()
            );
        }
        Ok(Self { commands })
    }

    /// Unwrap a datapoint update, where the frame sits under `value` or
    /// `data` either as JSON text or as an embedded object.
    pub fn from_datapoint(update: &Value) -> std::result::Result<Self, FrameError> {
        for key in ["value", "data"] {
            if let Some(Value::String(text)) = update.get(key) {
                return Self::from_json(text);
            }
        }
        for key in ["value", "data"] {
            if let Some(inner) = update.get(key).filter(|v| v.is_object()) {
                return Self::from_value(inner);
            }
        }
        if update.get("commands").is_some() {
            return Self::from_value(update);
        }
        Err(FrameError::UnexpectedFormat(kind_of(update).to_string()))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn arg_from_json(value: &Value) -> Arg {
    match value {
        Value::Number(n) => Arg::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Arg::Text(s.clone()),
        Value::Bool(b) => Arg::Number(if *b { 1.0 } else { 0.0 }),
        Value::Null => Arg::Text("null".to_string()),
        other => Arg::Text(other.to_string()),
    }
}

/// Integer field that may be sent as a number or a numeric string
fn lenient_u32(obj: &Map<String, Value>, key: &str) -> u32 {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn payload_from_json(obj: &Map<String, Value>) -> ImagePayload {
    ImagePayload::new(
        lenient_u32(obj, "width"),
        lenient_u32(obj, "height"),
        lenient_u32(obj, "depth"),
        obj.get("data").and_then(Value::as_str).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_without_cmd_or_args_are_skipped() {
        let frame = Frame::from_value(&json!({
            "commands": [
                {"cmd": "gsave", "args": []},
                {"cmd": "gsave"},
                {"args": [1]},
                42,
                {"cmd": "line", "args": [0, 0, 1, "2"]}
            ]
        }))
        .unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.commands[1].args[3], Arg::Text("2".to_string()));
    }

    #[test]
    fn missing_commands_array_is_an_error() {
        assert!(matches!(
            Frame::from_json(r#"{"cmds": []}"#),
            Err(FrameError::MissingCommands)
        ));
        assert!(matches!(Frame::from_json("not json"), Err(FrameError::Json(_))));
    }

    #[test]
    fn image_data_fields_are_lenient() {
        let frame = Frame::from_value(&json!({
            "commands": [{
                "cmd": "drawimage",
                "args": [0, 0, 1, 1, "a"],
                "image_data": {"width": "2", "height": 3.0, "data": "AAAA"}
            }]
        }))
        .unwrap();
        let image = frame.commands[0].image.as_ref().unwrap();
        assert_eq!((image.width, image.height, image.depth), (2, 3, 0));
        assert!(image.is_present());
    }

    #[test]
    fn datapoint_envelopes() {
        let text = json!({"data": r#"{"commands":[{"cmd":"gsave","args":[]}]}"#});
        assert_eq!(Frame::from_datapoint(&text).unwrap().len(), 1);

        let embedded = json!({"value": {"commands": []}});
        assert!(Frame::from_datapoint(&embedded).unwrap().is_empty());

        let bare = json!({"commands": [{"cmd": "x", "args": []}]});
        assert_eq!(Frame::from_datapoint(&bare).unwrap().len(), 1);

        assert!(matches!(
            Frame::from_datapoint(&json!({"value": 3})),
            Err(FrameError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn booleans_become_numbers() {
        assert_eq!(arg_from_json(&json!(true)), Arg::Number(1.0));
        assert_eq!(arg_from_json(&json!(null)), Arg::Text("null".to_string()));
    }
}
