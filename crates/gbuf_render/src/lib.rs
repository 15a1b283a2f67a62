//! gbuf Graphics Command Renderer
//!
//! Interprets the declarative 2D drawing stream an experiment controller
//! publishes once per display refresh, and draws each frame onto a
//! [`DrawingSurface`](gbuf_paint::DrawingSurface).
//!
//! - **Color codec**: palette and packed-RGB tokens
//! - **Viewport**: logical window to device pixels, y-flipped
//! - **Graphics state**: color, font, justification, orientation, line
//!   width, pen, with a save/restore stack
//! - **Dispatcher**: validates and executes one command at a time,
//!   isolating failures per command
//! - **Renderer**: per-frame reset, replay on resize, stats and image
//!   decode completion
//!
//! # Example
//!
//! ```
//! use gbuf_paint::PaintContext;
//! use gbuf_render::{Frame, Renderer, RendererConfig};
//!
//! let config = RendererConfig::with_size(200, 200);
//! let mut renderer = Renderer::new(PaintContext::new(200, 200), config);
//!
//! let frame = Frame::from_json(
//!     r#"{"commands":[
//!         {"cmd":"setwindow","args":[0,0,100,100]},
//!         {"cmd":"setcolor","args":[4]},
//!         {"cmd":"fcircle","args":[50,50,10]}
//!     ]}"#,
//! )
//! .unwrap();
//! renderer.render_commands(frame);
//!
//! assert_eq!(renderer.scale(), 2.0);
//! assert_eq!(renderer.stats().command_count, 3);
//! ```

pub mod color;
pub mod command;
pub mod config;
mod dispatch;
pub mod error;
pub mod frame;
pub mod renderer;
pub mod state;
pub mod stats;
pub mod viewport;

pub use color::{color_from_token, decode_color, pack_rgb, PALETTE};
pub use command::{Arg, Command};
pub use config::RendererConfig;
pub use error::{CommandError, ConfigError, FrameError, Result};
pub use frame::{Frame, RawCommand};
pub use renderer::{Renderer, Subscription};
pub use state::{Font, GraphicsStack, GraphicsState, Justification, Orientation};
pub use stats::RenderStats;
pub use viewport::{SourceDimensions, Viewport, WindowBounds};
