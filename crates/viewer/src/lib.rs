//! Game-loop coordinator for the voxel character viewer.
//!
//! [`Viewer`] owns the camera, frame clock, input flags, toggles and the
//! character, and is driven by a host with
//! `poll_events -> update -> render` until `should_close`.
//!
//! # Invariants
//! - Input flags are written only by key dispatch.
//! - Animation advances before camera motion within a frame.
//! - The weapon cycle index stays in `0..6` and only steps forward.

pub mod camera;
pub mod clock;
pub mod host;
pub mod hud;
pub mod state;
pub mod viewer;
pub mod weapons;

use voxview_assets::AssetError;
use voxview_character::CharacterError;
use voxview_common::ConfigError;
use voxview_render::RenderError;

pub use camera::Camera;
pub use clock::{FrameClock, FrameTiming, ManualClock, MonotonicCounter, SystemWallClock, TimeSource};
pub use host::{ApplicationHost, HeadlessApplication, HeadlessWindow, HostEvent, MouseButton, WindowHost};
pub use hud::HudLine;
pub use state::ViewerState;
pub use viewer::Viewer;
pub use weapons::{Loadout, WeaponCycle, WeaponOp};

/// Fatal viewer errors. Startup failures end the process.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("assets: {0}")]
    Asset(#[from] AssetError),
    #[error("character: {0}")]
    Character(#[from] CharacterError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
}
