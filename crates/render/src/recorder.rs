use crate::matrix::MatrixStack;
use crate::renderer::{
    ClearFlags, CubeInstance, CullMode, FontHandle, ProjectionMode, RenderContext, RenderError,
    RenderMode, TextRenderer, Viewport, ViewportId,
};
use glam::{Mat4, Vec3};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use voxview_common::Colour;

/// A text draw captured by the recorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDraw {
    pub font: FontHandle,
    pub x: f32,
    pub y: f32,
    pub colour: Colour,
    pub scale: f32,
    pub text: String,
}

/// One captured render call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BeginScene(ClearFlags),
    EndScene,
    PushMatrix,
    PopMatrix,
    MultiplyWorldMatrix(Mat4),
    SetProjectionMode(ProjectionMode, ViewportId),
    SetLookAt { eye: Vec3, target: Vec3, up: Vec3 },
    SetCullMode(CullMode),
    SetMultisampling(bool),
    SetRenderMode(RenderMode),
    DisableTexturing,
    DrawCubes {
        count: usize,
        mode: RenderMode,
        /// World matrix in effect at the draw.
        world: Mat4,
    },
    DrawText(TextDraw),
}

/// Every command issued between `begin_scene` and `end_scene`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub index: u64,
    pub commands: Vec<RenderCommand>,
}

impl RecordedFrame {
    pub fn texts(&self) -> impl Iterator<Item = &TextDraw> {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::DrawText(t) => Some(t),
            _ => None,
        })
    }

    pub fn text_lines(&self) -> Vec<String> {
        self.texts().map(|t| t.text.clone()).collect()
    }

    /// Total cubes drawn in `mode`.
    pub fn cube_count(&self, mode: RenderMode) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                RenderCommand::DrawCubes { count, mode: m, .. } if *m == mode => *count,
                _ => 0,
            })
            .sum()
    }

    pub fn contains(&self, command: &RenderCommand) -> bool {
        self.commands.contains(command)
    }

    /// Human-readable dump, used by headless tooling.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame {} ===", self.index);
        let _ = writeln!(out, "Commands: {}", self.commands.len());
        let _ = writeln!(
            out,
            "Cubes: solid={} wireframe={}",
            self.cube_count(RenderMode::Solid),
            self.cube_count(RenderMode::Wireframe)
        );
        for t in self.texts() {
            let _ = writeln!(out, "  ({:.0}, {:.0}) {}", t.x, t.y, t.text);
        }
        out
    }
}

/// Headless backend that records the command stream instead of drawing.
///
/// Keeps matrix-stack and viewport bookkeeping identical to a real backend so
/// that misuse (unbalanced pushes, unknown viewports) surfaces in tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    viewports: Vec<Viewport>,
    fonts: Vec<(PathBuf, u32)>,
    matrices: MatrixStack,
    render_mode: Option<RenderMode>,
    window_size: (u32, u32),
    scene: Option<RecordedFrame>,
    last_frame: Option<RecordedFrame>,
    frames_completed: u64,
}

impl RecordingRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.last_frame.as_ref()
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    pub fn viewport(&self, id: ViewportId) -> Option<&Viewport> {
        self.viewports.get(id.0)
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn fonts(&self) -> &[(PathBuf, u32)] {
        &self.fonts
    }

    fn record(&mut self, command: RenderCommand) {
        match &mut self.scene {
            Some(frame) => frame.commands.push(command),
            None => tracing::trace!(?command, "render command outside scene dropped"),
        }
    }
}

impl RenderContext for RecordingRenderer {
    fn begin_scene(&mut self, clear: ClearFlags) -> Result<(), RenderError> {
        self.matrices.reset();
        self.render_mode = Some(RenderMode::Solid);
        self.scene = Some(RecordedFrame {
            index: self.frames_completed,
            commands: vec![RenderCommand::BeginScene(clear)],
        });
        Ok(())
    }

    fn end_scene(&mut self) -> Result<(), RenderError> {
        let mut frame = self.scene.take().ok_or(RenderError::NoActiveScene)?;
        frame.commands.push(RenderCommand::EndScene);
        self.frames_completed += 1;
        self.last_frame = Some(frame);

        let depth = self.matrices.depth();
        if depth != 0 {
            self.matrices.reset();
            return Err(RenderError::UnbalancedMatrixStack { depth });
        }
        Ok(())
    }

    fn push_matrix(&mut self) {
        self.matrices.push();
        self.record(RenderCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        if let Err(e) = self.matrices.pop() {
            tracing::warn!("pop_matrix: {e}");
        }
        self.record(RenderCommand::PopMatrix);
    }

    fn multiply_world_matrix(&mut self, matrix: Mat4) {
        self.matrices.multiply(matrix);
        self.record(RenderCommand::MultiplyWorldMatrix(matrix));
    }

    fn set_projection_mode(
        &mut self,
        mode: ProjectionMode,
        viewport: ViewportId,
    ) -> Result<(), RenderError> {
        let vp = self
            .viewports
            .get(viewport.0)
            .ok_or(RenderError::UnknownViewport(viewport))?;
        self.matrices.set_projection(vp.projection(mode));
        self.record(RenderCommand::SetProjectionMode(mode, viewport));
        Ok(())
    }

    fn set_look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.matrices.look_at(eye, target, up);
        self.record(RenderCommand::SetLookAt { eye, target, up });
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.record(RenderCommand::SetCullMode(mode));
    }

    fn set_multisampling(&mut self, enabled: bool) {
        self.record(RenderCommand::SetMultisampling(enabled));
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = Some(mode);
        self.record(RenderCommand::SetRenderMode(mode));
    }

    fn disable_texturing(&mut self) {
        self.record(RenderCommand::DisableTexturing);
    }

    fn create_viewport(&mut self, viewport: Viewport) -> ViewportId {
        self.viewports.push(viewport);
        ViewportId(self.viewports.len() - 1)
    }

    fn resize_viewport(&mut self, id: ViewportId, viewport: Viewport) -> Result<(), RenderError> {
        let slot = self
            .viewports
            .get_mut(id.0)
            .ok_or(RenderError::UnknownViewport(id))?;
        *slot = viewport;
        Ok(())
    }

    fn resize_window(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    fn draw_cubes(&mut self, cubes: &[CubeInstance]) {
        if cubes.is_empty() {
            return;
        }
        let command = RenderCommand::DrawCubes {
            count: cubes.len(),
            mode: self.render_mode.unwrap_or(RenderMode::Solid),
            world: self.matrices.world(),
        };
        self.record(command);
    }
}

impl TextRenderer for RecordingRenderer {
    fn load_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, RenderError> {
        self.fonts.push((path.to_path_buf(), point_size));
        Ok(FontHandle(self.fonts.len() - 1))
    }

    /// Line height equals the point size.
    fn text_height(&self, font: FontHandle, _text: &str) -> f32 {
        self.fonts
            .get(font.0)
            .map(|(_, size)| *size as f32)
            .unwrap_or(0.0)
    }

    fn draw_text(
        &mut self,
        font: FontHandle,
        x: f32,
        y: f32,
        colour: Colour,
        scale: f32,
        text: &str,
    ) {
        self.record(RenderCommand::DrawText(TextDraw {
            font,
            x,
            y,
            colour,
            scale,
            text: text.to_string(),
        }));
    }
}
