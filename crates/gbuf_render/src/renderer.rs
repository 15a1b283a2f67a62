//! Frame renderer façade
//!
//! Owns the surface, graphics state and image cache. Every frame starts
//! from a cleared cache, default state and a surface filled with the
//! background; only the viewport carries over. The last frame is kept so a
//! resize can redraw it at the new scale.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use gbuf_image::{Completion, DecodedImage, ImageCache, PendingDecode};
use gbuf_paint::DrawingSurface;
use serde_json::Value;

use crate::config::RendererConfig;
use crate::dispatch::Dispatcher;
use crate::frame::Frame;
use crate::state::{GraphicsStack, GraphicsState};
use crate::stats::RenderStats;
use crate::viewport::{SourceDimensions, Viewport, WindowBounds};

/// Handle to a frame-delivery registration, cancelled on dispose
pub struct Subscription {
    cancel: Box<dyn FnOnce()>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

type StatsSink = Box<dyn FnMut(&RenderStats)>;

/// Executes frames of graphics commands onto a [`DrawingSurface`]
pub struct Renderer<S: DrawingSurface> {
    surface: S,
    config: RendererConfig,
    state: GraphicsStack,
    cache: ImageCache,
    pending: Vec<PendingDecode>,
    last_frame: Option<Arc<Frame>>,
    stats: RenderStats,
    stats_sinks: Vec<StatsSink>,
    subscriptions: Vec<Subscription>,
}

impl<S: DrawingSurface> Renderer<S> {
    /// Wrap `surface`, which should already be `config.width` x
    /// `config.height`, and clear it to the background.
    pub fn new(surface: S, config: RendererConfig) -> Self {
        let viewport = Viewport::new(config.width, config.height, config.auto_scale);
        let state = GraphicsStack::new(config.background(), viewport);
        let mut renderer = Self {
            surface,
            config,
            state,
            cache: ImageCache::new(),
            pending: Vec::new(),
            last_frame: None,
            stats: RenderStats::default(),
            stats_sinks: Vec::new(),
            subscriptions: Vec::new(),
        };
        renderer.clear();
        renderer
    }

    /// Execute one frame, replacing everything previously drawn
    pub fn render_commands(&mut self, frame: Frame) {
        self.render_shared(Arc::new(frame));
    }

    /// Execute a frame that is shared with the caller
    pub fn render_shared(&mut self, frame: Arc<Frame>) {
        self.last_frame = Some(Arc::clone(&frame));
        self.render_frame(&frame);
    }

    /// Parse and render a JSON frame document. Parse failures are logged
    /// and leave the surface untouched.
    pub fn render_json(&mut self, text: &str) {
        match Frame::from_json(text) {
            Ok(frame) => self.render_commands(frame),
            Err(err) => tracing::error!("Failed to parse graphics data: {}", err),
        }
    }

    /// Entry point for the frame-delivery channel
    pub fn handle_datapoint(&mut self, update: &Value) {
        match Frame::from_datapoint(update) {
            Ok(frame) => self.render_commands(frame),
            Err(err) => tracing::error!("Failed to process graphics data: {}", err),
        }
    }

    fn render_frame(&mut self, frame: &Frame) {
        self.cache.begin_frame();
        self.pending.clear();

        let background = self.config.background();
        self.state.reset(background);
        let full = self.state.current().viewport.device_rect();
        self.surface.fill_rect(full, background);

        let mut stats = RenderStats::default();
        let mut dispatcher = Dispatcher {
            surface: &mut self.surface,
            state: &mut self.state,
            cache: &mut self.cache,
            pending: &mut self.pending,
            deferred_decode: self.config.deferred_decode,
        };

        for raw in &frame.commands {
            stats.command_count += 1;
            if raw.name == "drawtext" {
                stats.text_command_count += 1;
            }

            let result = raw.parse().and_then(|command| match command {
                Some(command) => dispatcher.execute(&command),
                None => {
                    tracing::trace!("Ignoring unknown command {}", raw.name);
                    Ok(())
                }
            });
            if let Err(err) = result {
                stats.error_count += 1;
                tracing::warn!("Error executing graphics command: {}", err);
            }
        }

        stats.timestamp = Some(SystemTime::now());
        tracing::debug!(
            "{} (generation {})",
            stats.summary(self.config.width, self.config.height),
            self.cache.generation()
        );
        for sink in &mut self.stats_sinks {
            sink(&stats);
        }
        self.stats = stats;
    }

    /// Change the device size and redraw the last frame at the new scale
    pub fn resize(&mut self, width: u32, height: u32) {
        let (old_width, old_height) = (self.config.width, self.config.height);
        self.config.width = width;
        self.config.height = height;
        self.surface.resize(width, height);
        self.state.current_mut().viewport.resize(width, height);

        match self.last_frame.clone() {
            Some(frame) => self.render_frame(&frame),
            None => self.clear(),
        }
        tracing::info!(
            "Canvas resized from {}x{} to {}x{}",
            old_width,
            old_height,
            width,
            height
        );
    }

    /// Fill the surface with the current background without running commands
    pub fn clear(&mut self) {
        let state = self.state.current();
        self.surface.fill_rect(state.viewport.device_rect(), state.background);
    }

    /// Register a callback invoked with the stats of every frame
    pub fn on_stats(&mut self, sink: impl FnMut(&RenderStats) + 'static) {
        self.stats_sinks.push(Box::new(sink));
    }

    /// Keep a frame-delivery registration alive until [`dispose`](Self::dispose)
    pub fn attach_subscription(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Decode work queued by the last frame (deferred decode mode)
    pub fn take_pending_decodes(&mut self) -> Vec<PendingDecode> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_decodes(&self) -> &[PendingDecode] {
        &self.pending
    }

    /// Hand back a finished decode. Draws queued against it run now, unless
    /// the decode belongs to a superseded frame or entry. Returns whether the
    /// result was accepted.
    pub fn complete_decode(&mut self, decoded: DecodedImage) -> bool {
        match self.cache.complete(decoded) {
            Completion::Ready { bitmap, deferred } => {
                for draw in deferred {
                    self.surface.draw_bitmap(&bitmap, draw.dest);
                }
                true
            }
            Completion::Stale => false,
        }
    }

    /// Decode every queued payload on this thread and complete it
    pub fn flush_decodes(&mut self) -> usize {
        let mut accepted = 0;
        for job in self.take_pending_decodes() {
            let id = job.id.clone();
            match job.decode() {
                Ok(decoded) => {
                    if self.complete_decode(decoded) {
                        accepted += 1;
                    }
                }
                Err(err) => tracing::warn!("Failed to decode image {}: {}", id, err),
            }
        }
        accepted
    }

    /// Release subscriptions, cached images and the retained frame
    pub fn dispose(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        self.cache.clear();
        self.pending.clear();
        self.last_frame = None;
        self.clear();
        tracing::info!("Graphics renderer disposed: {}", self.config.stream_id);
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn scale(&self) -> f64 {
        self.state.current().viewport.scale()
    }

    pub fn source_dimensions(&self) -> Option<SourceDimensions> {
        self.state.current().viewport.source_dimensions()
    }

    pub fn window_bounds(&self) -> Option<WindowBounds> {
        self.state.current().viewport.window()
    }

    pub fn state(&self) -> &GraphicsState {
        self.state.current()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_deref()
    }

    pub fn cached_images(&self) -> usize {
        self.cache.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
