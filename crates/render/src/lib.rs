//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Callers never touch a graphics API directly; all drawing goes through
//!   [`RenderContext`] and [`TextRenderer`].
//! - Every `push_matrix` within a scene is matched by a `pop_matrix`.
//!
//! # Backends
//! [`RecordingRenderer`] captures the command stream for tests and headless
//! runs. The wgpu backend lives in `voxview-render-wgpu`.

mod matrix;
mod recorder;
mod renderer;

pub use matrix::MatrixStack;
pub use recorder::{RecordedFrame, RecordingRenderer, RenderCommand, TextDraw};
pub use renderer::{
    ClearFlags, CubeInstance, CullMode, FontHandle, ProjectionMode, RenderContext, RenderError,
    RenderMode, TextRenderer, Viewport, ViewportId,
};
