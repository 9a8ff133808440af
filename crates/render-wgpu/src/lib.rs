//! wgpu render backend for the voxel viewer.
//!
//! Cubes are drawn instanced, lit for solid passes and flat-coloured for
//! wireframe passes. Text goes through an egui overlay painted after the
//! scene.
//!
//! # Invariants
//! - Nothing reaches the GPU before `end_scene`.
//! - Matrix state is CPU-side and identical to the recording backend's.

mod context;
mod gpu;
mod shaders;
mod text;

pub use context::WgpuRenderContext;
