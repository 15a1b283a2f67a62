//! gbuf CLI - headless graphics frame renderer
//!
//! Renders a graphics command frame (the `{"commands": [...]}` document an
//! instrument controller publishes) without a display:
//! - `render`: rasterize to PNG
//! - `stats`: print per-frame statistics as JSON
//! - `dump`: list the drawing primitives a frame produces

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gbuf_paint::PaintContext;
use gbuf_recorder::Framebuffer;
use gbuf_render::{Frame, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gbuf")]
#[command(about = "Render graphics command frames headlessly")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize a frame to a PNG file
    Render {
        #[command(flatten)]
        input: Input,

        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },

    /// Print render statistics for a frame
    Stats {
        #[command(flatten)]
        input: Input,
    },

    /// List the drawing primitives produced by a frame
    Dump {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args, Debug)]
struct Input {
    /// Frame JSON file, or a datapoint carrying one under `value`/`data`
    frame: PathBuf,

    /// Renderer configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Surface width in pixels (overrides config)
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels (overrides config)
    #[arg(long)]
    height: Option<u32>,
}

impl Input {
    fn config(&self) -> Result<RendererConfig> {
        let mut config = match &self.config {
            Some(path) => RendererConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RendererConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }

    fn frame(&self) -> Result<Frame> {
        read_frame(&self.frame)
    }
}

fn read_frame(path: &Path) -> Result<Frame> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    Frame::from_datapoint(&value)
        .with_context(|| format!("No graphics frame in {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Render { input, output } => cmd_render(&input, &output),
        Command::Stats { input } => cmd_stats(&input),
        Command::Dump { input } => cmd_dump(&input),
    }
}

fn cmd_render(input: &Input, output: &Path) -> Result<()> {
    let config = input.config()?;
    let frame = input.frame()?;
    let surface = Framebuffer::new(config.width, config.height);
    let mut renderer = Renderer::new(surface, config);

    renderer.render_commands(frame);
    let resolved = renderer.flush_decodes();
    if resolved > 0 {
        tracing::debug!("Resolved {} deferred image decodes", resolved);
    }

    let capture = renderer.surface().capture();
    capture
        .save_png(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let stats = renderer.stats();
    println!(
        "{} -> {}",
        stats.summary(capture.width, capture.height),
        output.display()
    );
    if stats.error_count > 0 {
        println!("{} command(s) failed", stats.error_count);
    }
    Ok(())
}

fn cmd_stats(input: &Input) -> Result<()> {
    let config = input.config()?;
    let frame = input.frame()?;
    let surface = PaintContext::new(config.width, config.height);
    let mut renderer = Renderer::new(surface, config);
    renderer.render_commands(frame);

    let report = serde_json::json!({
        "stats": renderer.stats(),
        "scale": renderer.scale(),
        "window": renderer.window_bounds(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_dump(input: &Input) -> Result<()> {
    let config = input.config()?;
    let frame = input.frame()?;
    let surface = PaintContext::new(config.width, config.height);
    let mut renderer = Renderer::new(surface, config);
    renderer.render_commands(frame);
    renderer.flush_decodes();

    for (i, command) in renderer.surface().commands().iter().enumerate() {
        println!("{i:4}: {command:?}");
    }
    Ok(())
}
