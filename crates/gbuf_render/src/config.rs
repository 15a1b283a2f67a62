//! Renderer configuration, read from a TOML file of top-level keys

use std::fs;
use std::path::Path;

use gbuf_paint::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RendererConfig {
    /// Device surface width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Device surface height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// `#rrggbb` fill used to clear the surface
    #[serde(default = "default_background")]
    pub background_color: String,
    /// Datapoint the frames are published on
    #[serde(default = "default_stream_id")]
    pub stream_id: String,
    /// Derive scale from `setwindow`; when off the scale stays 1.0
    #[serde(default = "default_true")]
    pub auto_scale: bool,
    /// Queue image payloads for later decoding instead of decoding inline
    #[serde(default)]
    pub deferred_decode: bool,
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_stream_id() -> String {
    "graphics/main".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background(),
            stream_id: default_stream_id(),
            auto_scale: true,
            deferred_decode: false,
        }
    }
}

impl RendererConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parsed background; an unparsable value falls back to white
    pub fn background(&self) -> Color {
        Color::parse_hex(&self.background_color).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid background color {:?}, using white",
                self.background_color
            );
            Color::WHITE
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
