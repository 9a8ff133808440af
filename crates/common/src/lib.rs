//! Shared value types and the viewer configuration tree.
//!
//! # Invariants
//! - Every configuration field has a default, so an empty file is valid.
//! - Asset locations are resolved from configuration once, at startup.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, CharacterConfig, ConfigError, DisplayConfig, FontConfig, ModelConfig,
    ViewerConfig, WindowConfig,
};
pub use types::Colour;
