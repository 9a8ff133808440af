use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;
use voxview_common::Colour;
use voxview_render::{ClearFlags, CullMode, RenderMode};
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
pub(crate) const MSAA_SAMPLES: u32 = 4;
/// Uniform slots must sit on 256-byte boundaries for dynamic offsets.
const UNIFORM_SLOT: u64 = 256;
pub(crate) const MAX_BATCHES: usize = 256;
pub(crate) const MAX_INSTANCES: usize = 16_384;

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.15,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: Mat4, colour: Colour) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: colour.to_array(),
        }
    }
}

/// A run of instances sharing pipeline state and camera.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Batch {
    pub view_proj: Mat4,
    pub mode: RenderMode,
    pub cull: CullMode,
    pub instances: Range<u32>,
}

/// Cube draws collected between `begin_scene` and `end_scene`.
#[derive(Debug, Default)]
pub(crate) struct SceneBatches {
    pub batches: Vec<Batch>,
    pub instances: Vec<InstanceData>,
    dropped: usize,
}

impl SceneBatches {
    pub fn clear(&mut self) {
        self.batches.clear();
        self.instances.clear();
        self.dropped = 0;
    }

    /// Append instances, extending the last batch when its state matches.
    /// Instances beyond the buffer limits are counted and dropped.
    pub fn push(
        &mut self,
        view_proj: Mat4,
        mode: RenderMode,
        cull: CullMode,
        instances: impl IntoIterator<Item = InstanceData>,
    ) {
        let start = self.instances.len();
        let room = MAX_INSTANCES - start;
        let mut offered: usize = 0;
        for instance in instances {
            offered += 1;
            if self.instances.len() < MAX_INSTANCES {
                self.instances.push(instance);
            }
        }
        self.dropped += offered.saturating_sub(room);
        let end = self.instances.len();
        if end == start {
            return;
        }
        let range = start as u32..end as u32;

        if let Some(last) = self.batches.last_mut() {
            if last.view_proj == view_proj
                && last.mode == mode
                && last.cull == cull
                && last.instances.end == range.start
            {
                last.instances.end = range.end;
                return;
            }
        }
        if self.batches.len() == MAX_BATCHES {
            self.dropped += range.len();
            self.instances.truncate(start);
            return;
        }
        self.batches.push(Batch {
            view_proj,
            mode,
            cull,
            instances: range,
        });
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Unit cube with per-face normals, counter-clockwise seen from outside.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for axis in 0..3 {
        for sign in [1.0_f32, -1.0] {
            let n = Vec3::AXES[axis] * sign;
            // u x v == n keeps the winding outward on both sides
            let (u, v) = if sign > 0.0 {
                (Vec3::AXES[(axis + 1) % 3], Vec3::AXES[(axis + 2) % 3])
            } else {
                (Vec3::AXES[(axis + 2) % 3], Vec3::AXES[(axis + 1) % 3])
            };
            let base = vertices.len() as u16;
            for (du, dv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(Vertex {
                    position: ((n + u * du + v * dv) * 0.5).to_array(),
                    normal: n.to_array(),
                });
            }
            indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
        }
    }
    (vertices, indices)
}

/// The twelve edges of the unit cube as a line list.
fn cube_edges() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let vertices = (0..8)
        .map(|i| Vertex {
            position: [
                if i & 1 == 0 { -p } else { p },
                if i & 2 == 0 { -p } else { p },
                if i & 4 == 0 { -p } else { p },
            ],
            normal: [0.0; 3],
        })
        .collect();
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1, 2,3, 4,5, 6,7, // along X
        0,2, 1,3, 4,6, 5,7, // along Y
        0,4, 1,5, 2,6, 3,7, // along Z
    ];
    (vertices, indices)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    mode: RenderMode,
    cull: CullMode,
    samples: u32,
}

struct Mesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    fn new(device: &wgpu::Device, label: &str, (vertices, indices): (Vec<Vertex>, Vec<u16>)) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Depth buffers and the multisampled colour target, sized to the surface.
struct Targets {
    depth: wgpu::TextureView,
    msaa_depth: Option<wgpu::TextureView>,
    msaa_colour: Option<wgpu::TextureView>,
}

/// Pipelines, meshes and buffers for drawing cube batches.
pub(crate) struct GpuScene {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube: Mesh,
    edges: Mesh,
    instance_buffer: wgpu::Buffer,
    targets: Targets,
    surface_format: wgpu::TextureFormat,
    msaa_supported: bool,
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        msaa_supported: bool,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: UNIFORM_SLOT * MAX_BATCHES as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_size = NonZeroU64::new(std::mem::size_of::<Uniforms>() as u64);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: uniform_size,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: uniform_size,
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let mut pipelines = HashMap::new();
        let sample_counts: &[u32] = if msaa_supported {
            &[1, MSAA_SAMPLES]
        } else {
            &[1]
        };
        for &samples in sample_counts {
            for mode in [RenderMode::Solid, RenderMode::Wireframe] {
                for cull in [CullMode::None, CullMode::Back, CullMode::Front] {
                    let key = PipelineKey {
                        mode,
                        cull,
                        samples,
                    };
                    let pipeline =
                        build_pipeline(device, &pipeline_layout, &shader, surface_format, key);
                    pipelines.insert(key, pipeline);
                }
            }
        }

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let targets = create_targets(device, surface_format, width, height, msaa_supported);

        Self {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            cube: Mesh::new(device, "cube", cube_mesh()),
            edges: Mesh::new(device, "edges", cube_edges()),
            instance_buffer,
            targets,
            surface_format,
            msaa_supported,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = create_targets(
            device,
            self.surface_format,
            width,
            height,
            self.msaa_supported,
        );
    }

    pub fn sample_count(&self, multisampling: bool) -> u32 {
        if multisampling && self.msaa_supported {
            MSAA_SAMPLES
        } else {
            1
        }
    }

    /// Record the cube pass into `encoder`, resolving into `view` when
    /// multisampled.
    pub fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &SceneBatches,
        clear: ClearFlags,
        samples: u32,
    ) {
        for (i, batch) in scene.batches.iter().enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                i as u64 * UNIFORM_SLOT,
                bytemuck::bytes_of(&Uniforms {
                    view_proj: batch.view_proj.to_cols_array_2d(),
                }),
            );
        }
        if !scene.instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&scene.instances),
            );
        }

        let multisampled = samples > 1;
        let (colour_view, resolve_target, depth_view) = match (
            multisampled,
            &self.targets.msaa_colour,
            &self.targets.msaa_depth,
        ) {
            (true, Some(colour), Some(depth)) => (colour, Some(view), depth),
            _ => (view, None, &self.targets.depth),
        };
        let samples = if resolve_target.is_some() { samples } else { 1 };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: colour_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: if clear.colour {
                        wgpu::LoadOp::Clear(CLEAR_COLOUR)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: if multisampled {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: if clear.depth {
                        wgpu::LoadOp::Clear(1.0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: if clear.stencil {
                        wgpu::LoadOp::Clear(0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });

        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for (i, batch) in scene.batches.iter().enumerate() {
            let key = PipelineKey {
                mode: batch.mode,
                cull: batch.cull,
                samples,
            };
            let Some(pipeline) = self.pipelines.get(&key) else {
                continue;
            };
            let mesh = match batch.mode {
                RenderMode::Solid => &self.cube,
                RenderMode::Wireframe => &self.edges,
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[(i as u64 * UNIFORM_SLOT) as u32]);
            pass.set_vertex_buffer(0, mesh.vertices.slice(..));
            pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let (topology, fragment) = match key.mode {
        RenderMode::Solid => (wgpu::PrimitiveTopology::TriangleList, "fs_lit"),
        RenderMode::Wireframe => (wgpu::PrimitiveTopology::LineList, "fs_flat"),
    };
    let cull_mode = match key.cull {
        CullMode::None => None,
        CullMode::Back => Some(wgpu::Face::Back),
        CullMode::Front => Some(wgpu::Face::Front),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("cube_pipeline_{:?}_{:?}_x{}", key.mode, key.cull, key.samples)),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: if topology == wgpu::PrimitiveTopology::LineList {
                None
            } else {
                cull_mode
            },
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: key.samples,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

fn create_targets(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    msaa_supported: bool,
) -> Targets {
    let texture = |label: &str, format: wgpu::TextureFormat, samples: u32| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default())
    };

    Targets {
        depth: texture("depth_texture", DEPTH_FORMAT, 1),
        msaa_depth: msaa_supported.then(|| texture("msaa_depth_texture", DEPTH_FORMAT, MSAA_SAMPLES)),
        msaa_colour: msaa_supported
            .then(|| texture("msaa_colour_texture", surface_format, MSAA_SAMPLES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> InstanceData {
        InstanceData::new(Mat4::IDENTITY, Colour::WHITE)
    }

    #[test]
    fn instance_data_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let data = InstanceData::new(m, Colour::YELLOW);
        assert_eq!(data.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(data.color, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn matching_state_extends_last_batch() {
        let mut s = SceneBatches::default();
        s.push(Mat4::IDENTITY, RenderMode::Solid, CullMode::Back, [instance(); 2]);
        s.push(Mat4::IDENTITY, RenderMode::Solid, CullMode::Back, [instance(); 3]);
        assert_eq!(s.batches.len(), 1);
        assert_eq!(s.batches[0].instances, 0..5);
    }

    #[test]
    fn state_change_starts_new_batch() {
        let mut s = SceneBatches::default();
        s.push(Mat4::IDENTITY, RenderMode::Solid, CullMode::Back, [instance(); 2]);
        s.push(Mat4::IDENTITY, RenderMode::Wireframe, CullMode::Back, [instance(); 2]);
        s.push(Mat4::from_scale(Vec3::splat(2.0)), RenderMode::Wireframe, CullMode::Back, [instance(); 1]);
        assert_eq!(s.batches.len(), 3);
        assert_eq!(s.batches[2].instances, 4..5);
    }

    #[test]
    fn empty_push_adds_nothing() {
        let mut s = SceneBatches::default();
        s.push(Mat4::IDENTITY, RenderMode::Solid, CullMode::Back, []);
        assert!(s.batches.is_empty());
    }

    #[test]
    fn instances_past_capacity_are_dropped() {
        let mut s = SceneBatches::default();
        s.push(
            Mat4::IDENTITY,
            RenderMode::Solid,
            CullMode::Back,
            std::iter::repeat_n(instance(), MAX_INSTANCES + 10),
        );
        assert_eq!(s.instances.len(), MAX_INSTANCES);
        assert_eq!(s.dropped(), 10);
        s.clear();
        assert_eq!(s.dropped(), 0);
        assert!(s.instances.is_empty());
    }

    #[test]
    fn cube_faces_wind_outward() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let facing = (b - a).cross(c - a).normalize();
            let normal = Vec3::from(vertices[tri[0] as usize].normal);
            assert!((facing - normal).length() < 1e-5);
            assert!((a.dot(normal) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn edge_mesh_has_twelve_lines() {
        let (vertices, indices) = cube_edges();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 24);
        // every edge joins corners differing in exactly one axis
        for pair in indices.chunks(2) {
            assert_eq!((pair[0] ^ pair[1]).count_ones(), 1);
        }
    }
}
