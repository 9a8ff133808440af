mod window;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voxview_character::VoxelCharacter;
use voxview_common::ViewerConfig;
use voxview_render_wgpu::WgpuRenderContext;
use voxview_viewer::{ApplicationHost, FrameClock, Viewer};
use window::WinitWindow;

#[derive(Parser)]
#[command(name = "voxview-desktop", about = "Voxel character viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Close after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

/// Application host for the desktop build. Logs the frame rate about once a
/// second and closes after an optional frame limit.
struct DesktopApplication {
    frame_limit: Option<u64>,
    frames: u64,
    since_report: f32,
    frames_since_report: u32,
    close: bool,
}

impl DesktopApplication {
    fn new(frame_limit: Option<u64>) -> Self {
        Self {
            frame_limit,
            frames: 0,
            since_report: 0.0,
            frames_since_report: 0,
            close: frame_limit == Some(0),
        }
    }
}

impl ApplicationHost for DesktopApplication {
    fn update(&mut self, dt: f32) {
        self.frames += 1;
        self.frames_since_report += 1;
        self.since_report += dt;
        if self.since_report >= 1.0 {
            tracing::debug!(
                fps = self.frames_since_report as f32 / self.since_report,
                frames = self.frames,
                "frame rate"
            );
            self.since_report = 0.0;
            self.frames_since_report = 0;
        }
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            tracing::info!(frames = self.frames, "frame limit reached");
            self.close = true;
        }
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn destroy(&mut self) {
        tracing::debug!(frames = self.frames, "application destroyed");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("voxview-desktop starting");

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let (host, window) = WinitWindow::open(&config.window)?;
    let render = WgpuRenderContext::new(window)?;
    let app = DesktopApplication::new(cli.frames);

    let mut viewer: Viewer<_, VoxelCharacter, _, _> =
        Viewer::create(config, render, host, app, FrameClock::system())?;
    let frames = viewer.run()?;
    viewer.destroy();

    tracing::info!(frames, "voxview-desktop exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frame_limit_closes_before_the_first_frame() {
        assert!(DesktopApplication::new(Some(0)).should_close());
        assert!(!DesktopApplication::new(None).should_close());
    }

    #[test]
    fn frame_limit_closes_after_last_update() {
        let mut app = DesktopApplication::new(Some(2));
        app.update(0.016);
        assert!(!app.should_close());
        app.update(0.016);
        assert!(app.should_close());
    }
}
