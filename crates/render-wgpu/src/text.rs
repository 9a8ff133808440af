//! Screen-space text drawn through egui on top of the finished scene.

use std::path::Path;
use std::sync::Arc;
use voxview_common::Colour;
use voxview_render::{FontHandle, RenderError};
use winit::window::Window;

struct LoadedFont {
    family: egui::FontFamily,
    point_size: u32,
}

struct QueuedText {
    font: FontHandle,
    x: f32,
    y: f32,
    colour: Colour,
    scale: f32,
    text: String,
}

/// Queues text during a scene and paints it in one egui pass at the end.
pub(crate) struct TextOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    definitions: egui::FontDefinitions,
    fonts: Vec<LoadedFont>,
    queued: Vec<QueuedText>,
}

impl TextOverlay {
    pub fn new(device: &wgpu::Device, window: &Window, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
            definitions: egui::FontDefinitions::default(),
            fonts: Vec::new(),
            queued: Vec::new(),
        }
    }

    /// Register a TTF/OTF file as its own font family.
    pub fn load_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::FontLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = FontHandle(self.fonts.len());
        let name = format!("voxview-font-{}", handle.0);

        self.definitions
            .font_data
            .insert(name.clone(), Arc::new(egui::FontData::from_owned(bytes)));
        let family = egui::FontFamily::Name(name.clone().into());
        self.definitions
            .families
            .insert(family.clone(), vec![name]);
        self.ctx.set_fonts(self.definitions.clone());

        tracing::debug!(path = %path.display(), point_size, "font loaded");
        self.fonts.push(LoadedFont { family, point_size });
        Ok(handle)
    }

    pub fn text_height(&self, font: FontHandle) -> f32 {
        self.fonts
            .get(font.0)
            .map(|f| f.point_size as f32)
            .unwrap_or(0.0)
    }

    pub fn queue(&mut self, font: FontHandle, x: f32, y: f32, colour: Colour, scale: f32, text: &str) {
        if font.0 >= self.fonts.len() {
            tracing::warn!(?font, "draw_text with unknown font");
            return;
        }
        self.queued.push(QueuedText {
            font,
            x,
            y,
            colour,
            scale,
            text: text.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.queued.clear();
    }

    /// Paint queued text onto `view` and drop the queue.
    pub fn encode(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let queued = std::mem::take(&mut self.queued);
        let fonts = &self.fonts;
        let height = size_in_pixels[1] as f32;

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            let ppp = ctx.pixels_per_point();
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("hud_text"),
            ));
            for item in &queued {
                let Some(font) = fonts.get(item.font.0) else {
                    continue;
                };
                let [r, g, b, a] = item.colour.to_array().map(|c| (c * 255.0).round() as u8);
                painter.text(
                    egui::pos2(item.x / ppp, (height - item.y) / ppp),
                    egui::Align2::LEFT_BOTTOM,
                    &item.text,
                    egui::FontId::new(
                        font.point_size as f32 * item.scale / ppp,
                        font.family.clone(),
                    ),
                    egui::Color32::from_rgba_unmultiplied(r, g, b, a),
                );
            }
        });
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("text_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
