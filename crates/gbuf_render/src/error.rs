//! Renderer error types
//!
//! None of these escape [`Renderer::render_commands`](crate::Renderer::render_commands):
//! the dispatcher logs them and moves on to the next command.

use gbuf_image::ImageError;
use thiserror::Error;

/// A single command that cannot be executed
#[derive(Error, Debug)]
pub enum CommandError {
    /// A required argument is absent
    #[error("{command}: missing argument {index}")]
    MissingArgument { command: String, index: usize },

    /// An argument has the wrong type
    #[error("{command}: argument {index} is not a number ({found})")]
    BadArgument {
        command: String,
        index: usize,
        found: String,
    },

    /// Polygon point list is short or odd
    #[error("{command}: need an even number of args >= 6, got {count}")]
    InvalidPolygon { command: String, count: usize },

    /// Inline image payload could not be decoded
    #[error("drawimage {id}: {source}")]
    Image {
        id: String,
        #[source]
        source: ImageError,
    },
}

/// A frame document that cannot be interpreted
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid frame JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no commands array in frame data")]
    MissingCommands,

    #[error("unexpected datapoint format: {0}")]
    UnexpectedFormat(String),
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for command parsing
pub type Result<T> = std::result::Result<T, CommandError>;
