use glam::{Mat4, Vec3};
use serde::Serialize;
use std::path::{Path, PathBuf};
use voxview_common::Colour;

/// Errors reported by render backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),
    #[error("unknown viewport {0:?}")]
    UnknownViewport(ViewportId),
    #[error("unknown font {0:?}")]
    UnknownFont(FontHandle),
    #[error("failed to load font {path}: {source}")]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("matrix stack underflow")]
    MatrixUnderflow,
    #[error("scene ended with {depth} unpopped matrices")]
    UnbalancedMatrixStack { depth: usize },
    #[error("end_scene called without begin_scene")]
    NoActiveScene,
}

/// Handle to a viewport created on a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewportId(pub usize);

/// Handle to a font loaded on a text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FontHandle(pub usize);

/// A screen rectangle plus the field of view used for perspective projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f32,
}

impl Viewport {
    pub const NEAR: f32 = 0.01;
    pub const FAR: f32 = 1000.0;

    pub fn new(width: u32, height: u32, fov_degrees: f32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            fov_degrees,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Projection for `mode`. The 2D projection maps one unit to one pixel
    /// with the origin at the bottom-left corner.
    pub fn projection(&self, mode: ProjectionMode) -> Mat4 {
        match mode {
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.fov_degrees.to_radians(),
                self.aspect(),
                Self::NEAR,
                Self::FAR,
            ),
            ProjectionMode::TwoD => Mat4::orthographic_rh(
                0.0,
                self.width as f32,
                0.0,
                self.height as f32,
                Self::NEAR,
                Self::FAR,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectionMode {
    Perspective,
    TwoD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CullMode {
    None,
    Back,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RenderMode {
    Solid,
    Wireframe,
}

/// Which buffers `begin_scene` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearFlags {
    pub colour: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearFlags {
    pub const ALL: Self = Self {
        colour: true,
        depth: true,
        stencil: true,
    };
}

/// One voxel-sized box. `transform` maps the unit cube centred on the origin
/// into the current world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeInstance {
    pub transform: Mat4,
    pub colour: Colour,
}

impl CubeInstance {
    pub fn new(center: Vec3, size: Vec3, colour: Colour) -> Self {
        Self {
            transform: Mat4::from_scale_rotation_translation(size, glam::Quat::IDENTITY, center),
            colour,
        }
    }
}

/// Renderer-agnostic immediate-mode interface. All backends implement this trait.
///
/// State (matrices, projection, cull mode, render mode) persists between
/// calls within a scene; `push_matrix`/`pop_matrix` save and restore the
/// projection, view and world matrices together.
pub trait RenderContext {
    fn begin_scene(&mut self, clear: ClearFlags) -> Result<(), RenderError>;
    /// Finish the scene and submit it for presentation.
    fn end_scene(&mut self) -> Result<(), RenderError>;

    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn multiply_world_matrix(&mut self, matrix: Mat4);

    fn set_projection_mode(
        &mut self,
        mode: ProjectionMode,
        viewport: ViewportId,
    ) -> Result<(), RenderError>;
    fn set_look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3);
    fn set_cull_mode(&mut self, mode: CullMode);
    fn set_multisampling(&mut self, enabled: bool);
    fn set_render_mode(&mut self, mode: RenderMode);
    /// Unbind any texture state left behind by earlier passes.
    fn disable_texturing(&mut self);

    fn create_viewport(&mut self, viewport: Viewport) -> ViewportId;
    fn resize_viewport(&mut self, id: ViewportId, viewport: Viewport) -> Result<(), RenderError>;
    fn resize_window(&mut self, width: u32, height: u32);

    /// Draw boxes under the current world matrix.
    fn draw_cubes(&mut self, cubes: &[CubeInstance]);
}

/// Screen-space text drawing. Coordinates are pixels from the bottom-left.
pub trait TextRenderer {
    fn load_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, RenderError>;
    fn text_height(&self, font: FontHandle, text: &str) -> f32;
    fn draw_text(
        &mut self,
        font: FontHandle,
        x: f32,
        y: f32,
        colour: Colour,
        scale: f32,
        text: &str,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_aspect_guards_zero_height() {
        let v = Viewport::new(800, 0, 60.0);
        assert_eq!(v.aspect(), 800.0);
        assert_eq!(Viewport::new(800, 400, 60.0).aspect(), 2.0);
    }

    #[test]
    fn two_d_projection_maps_pixels_to_ndc() {
        let v = Viewport::new(800, 600, 60.0);
        let p = v.projection(ProjectionMode::TwoD);
        let corner = p.project_point3(Vec3::new(800.0, 600.0, -1.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
        let origin = p.project_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!((origin.x + 1.0).abs() < 1e-5);
        assert!((origin.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_projection_is_finite() {
        let p = Viewport::new(800, 800, 60.0).projection(ProjectionMode::Perspective);
        assert!(p.is_finite());
    }

    #[test]
    fn cube_instance_places_unit_cube() {
        let c = CubeInstance::new(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(2.0), Colour::WHITE);
        let corner = c.transform.transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(2.0, 3.0, 4.0));
    }
}
