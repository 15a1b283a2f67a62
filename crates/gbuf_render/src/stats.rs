//! Per-frame render statistics

use std::time::SystemTime;

use serde::Serialize;

/// What the last frame did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderStats {
    /// Commands carrying a name and args, known or not
    pub command_count: usize,
    /// `drawtext` commands
    pub text_command_count: usize,
    /// Commands dropped after an error
    pub error_count: usize,
    /// When the frame finished
    pub timestamp: Option<SystemTime>,
}

impl RenderStats {
    /// One-line summary, as shown in a status bar
    pub fn summary(&self, width: u32, height: u32) -> String {
        format!(
            "Rendered {} commands ({} text) [{}\u{d7}{}]",
            self.command_count, self.text_command_count, width, height
        )
    }
}
