//! Voxel character: the animated model the viewer displays.
//!
//! [`Character`] is the seam between the viewer and a character
//! implementation. [`VoxelCharacter`] implements it with a box mannequin whose
//! limbs are posed procedurally from the clips listed in the model's
//! `.animlist`.
//!
//! # Invariants
//! - A character only exists once every asset file it names has been found.
//! - Animation time is advanced only through [`Character::update`].

mod face;
mod mannequin;
mod section;
mod timer;
mod voxel;
mod weapon;

use glam::Mat4;
use std::path::Path;
use voxview_assets::{AssetError, AssetPaths};
use voxview_common::Colour;
use voxview_render::RenderContext;

pub use section::{AnimationSection, SectionSpeeds};
pub use timer::AnimationTimer;
pub use voxel::VoxelCharacter;
pub use weapon::Hand;

/// Errors from loading or driving a character.
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("unknown animation '{0}'")]
    UnknownAnimation(String),
}

/// Flags passed to the body and weapon render calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Draw an outline pass over the solid pass.
    pub outline: bool,
    /// Draw mirrored below the ground plane.
    pub reflection: bool,
    /// Draw as a flat silhouette.
    pub silhouette: bool,
    pub outline_colour: Colour,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            outline: false,
            reflection: false,
            silhouette: false,
            outline_colour: Colour::YELLOW,
        }
    }
}

/// Idle behaviour and presentation settings applied at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleSettings {
    pub breathing: bool,
    pub wink: bool,
    pub talking: bool,
    pub random_mouth: bool,
    pub random_look: bool,
    pub wireframe: bool,
    pub scale: f32,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            breathing: true,
            wink: true,
            talking: false,
            random_mouth: true,
            random_look: true,
            wireframe: false,
            scale: 0.08,
        }
    }
}

/// The character collaborator driven by the viewer.
pub trait Character {
    /// Load the model described by `paths`. `seed` drives idle randomness.
    fn load(paths: &AssetPaths, seed: u64) -> Result<Self, CharacterError>
    where
        Self: Sized;

    /// Advance animation by `dt` seconds, scaled per section by `speeds`.
    fn update(&mut self, dt: f32, timer: &AnimationTimer, speeds: &SectionSpeeds);
    /// Record weapon tip positions under `world`.
    fn update_weapon_trails(&mut self, dt: f32, world: Mat4);

    fn render(&self, ctx: &mut dyn RenderContext, options: &RenderOptions);
    fn render_weapons(&self, ctx: &mut dyn RenderContext, options: &RenderOptions);
    fn render_face(&self, ctx: &mut dyn RenderContext);

    fn animation_count(&self) -> usize;
    fn animation_name(&self, index: usize) -> Option<&str>;
    /// Start `name` on `section`; with `blend`, cross-fade from the pose
    /// currently shown on `blend_from`.
    fn play_animation(
        &mut self,
        section: AnimationSection,
        blend: bool,
        blend_from: AnimationSection,
        name: &str,
    ) -> Result<(), CharacterError>;

    fn set_breathing(&mut self, enabled: bool);
    fn set_wink(&mut self, enabled: bool);
    fn set_talking(&mut self, enabled: bool);
    fn set_random_mouth(&mut self, enabled: bool);
    fn set_random_look(&mut self, enabled: bool);
    fn set_wireframe(&mut self, enabled: bool);
    fn set_scale(&mut self, scale: f32);

    fn load_weapon(&mut self, hand: Hand, path: &Path) -> Result<(), CharacterError>;
    fn unload_weapon(&mut self, hand: Hand);

    /// Apply every idle setting at once.
    fn configure(&mut self, settings: &IdleSettings) {
        self.set_breathing(settings.breathing);
        self.set_wink(settings.wink);
        self.set_talking(settings.talking);
        self.set_random_mouth(settings.random_mouth);
        self.set_random_look(settings.random_look);
        self.set_wireframe(settings.wireframe);
        self.set_scale(settings.scale);
    }
}
