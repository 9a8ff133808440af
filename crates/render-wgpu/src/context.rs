use crate::gpu::{GpuScene, InstanceData, SceneBatches, DEPTH_FORMAT, MAX_INSTANCES, MSAA_SAMPLES};
use crate::text::TextOverlay;
use glam::{Mat4, Vec3};
use std::path::Path;
use std::sync::Arc;
use voxview_common::Colour;
use voxview_render::{
    ClearFlags, CubeInstance, CullMode, FontHandle, MatrixStack, ProjectionMode, RenderContext,
    RenderError, RenderMode, TextRenderer, Viewport, ViewportId,
};
use winit::window::Window;

struct ActiveScene {
    clear: ClearFlags,
    /// `None` when the surface could not provide a texture this frame.
    target: Option<wgpu::SurfaceTexture>,
}

/// [`RenderContext`] and [`TextRenderer`] on top of a wgpu surface.
///
/// Draw calls are batched on the CPU and submitted in one command buffer at
/// `end_scene`, which also presents the frame.
pub struct WgpuRenderContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    gpu: GpuScene,
    text: TextOverlay,
    matrices: MatrixStack,
    viewports: Vec<Viewport>,
    cull: CullMode,
    render_mode: RenderMode,
    multisampling: bool,
    batches: SceneBatches,
    scene: Option<ActiveScene>,
}

impl WgpuRenderContext {
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RenderError::Surface(format!("create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::Surface("no compatible GPU adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("voxview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Surface(format!("create device: {e}")))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let msaa_supported = [surface_format, DEPTH_FORMAT].iter().all(|format| {
            adapter
                .get_texture_format_features(*format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        });
        let gpu = GpuScene::new(
            &device,
            surface_format,
            config.width,
            config.height,
            msaa_supported,
        );
        let text = TextOverlay::new(&device, &window, surface_format);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            msaa_supported,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            gpu,
            text,
            matrices: MatrixStack::new(),
            viewports: Vec::new(),
            cull: CullMode::Back,
            render_mode: RenderMode::Solid,
            multisampling: false,
            batches: SceneBatches::default(),
            scene: None,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping frame");
                Ok(None)
            }
            Err(e) => Err(RenderError::Surface(e.to_string())),
        }
    }
}

impl RenderContext for WgpuRenderContext {
    fn begin_scene(&mut self, clear: ClearFlags) -> Result<(), RenderError> {
        if self.scene.is_some() {
            tracing::warn!("begin_scene while a scene is open, discarding it");
        }
        self.matrices.reset();
        self.render_mode = RenderMode::Solid;
        self.cull = CullMode::Back;
        self.batches.clear();
        self.text.clear();
        let target = self.acquire()?;
        self.scene = Some(ActiveScene { clear, target });
        Ok(())
    }

    fn end_scene(&mut self) -> Result<(), RenderError> {
        let scene = self.scene.take().ok_or(RenderError::NoActiveScene)?;
        let depth = self.matrices.depth();
        if self.batches.dropped() > 0 {
            tracing::warn!(
                dropped = self.batches.dropped(),
                limit = MAX_INSTANCES,
                "cube instances over budget were not drawn"
            );
        }

        if let Some(target) = scene.target {
            let view = target
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("scene_encoder"),
                });
            self.gpu.encode(
                &self.queue,
                &mut encoder,
                &view,
                &self.batches,
                scene.clear,
                self.gpu.sample_count(self.multisampling),
            );
            self.text.encode(
                &self.window,
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                [self.config.width, self.config.height],
            );
            self.queue.submit(std::iter::once(encoder.finish()));
            self.window.pre_present_notify();
            target.present();
        }

        if depth != 0 {
            self.matrices.reset();
            return Err(RenderError::UnbalancedMatrixStack { depth });
        }
        Ok(())
    }

    fn push_matrix(&mut self) {
        self.matrices.push();
    }

    fn pop_matrix(&mut self) {
        if let Err(e) = self.matrices.pop() {
            tracing::warn!("pop_matrix: {e}");
        }
    }

    fn multiply_world_matrix(&mut self, matrix: Mat4) {
        self.matrices.multiply(matrix);
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
        Ok(())
    }

    fn set_look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.matrices.look_at(eye, target, up);
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull = mode;
    }

    fn set_multisampling(&mut self, enabled: bool) {
        self.multisampling = enabled;
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    /// Cubes carry no textures, so there is nothing to unbind.
    fn disable_texturing(&mut self) {
        tracing::trace!("disable_texturing");
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
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.gpu.resize(&self.device, width, height);
        tracing::debug!(width, height, "surface resized");
    }

    fn draw_cubes(&mut self, cubes: &[CubeInstance]) {
        if self.scene.is_none() {
            tracing::trace!(count = cubes.len(), "draw_cubes outside scene dropped");
            return;
        }
        let world = self.matrices.world();
        self.batches.push(
            self.matrices.view_projection(),
            self.render_mode,
            self.cull,
            cubes
                .iter()
                .map(|c| InstanceData::new(world * c.transform, c.colour)),
        );
    }
}

impl TextRenderer for WgpuRenderContext {
    fn load_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, RenderError> {
        self.text.load_font(path, point_size)
    }

    /// Line height equals the point size.
    fn text_height(&self, font: FontHandle, _text: &str) -> f32 {
        self.text.text_height(font)
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
        if self.scene.is_none() {
            return;
        }
        self.text.queue(font, x, y, colour, scale, text);
    }
}
