/// WGSL for instanced voxel cubes. `fs_lit` shades solid faces, `fs_flat`
/// draws wireframe edges in their instance colour.
pub const CUBE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct Corner {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Voxel {
    @location(2) col0: vec4<f32>,
    @location(3) col1: vec4<f32>,
    @location(4) col2: vec4<f32>,
    @location(5) col3: vec4<f32>,
    @location(6) tint: vec4<f32>,
};

struct Varyings {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) tint: vec4<f32>,
};

@vertex
fn vs_main(corner: Corner, voxel: Voxel) -> Varyings {
    let world = mat4x4<f32>(voxel.col0, voxel.col1, voxel.col2, voxel.col3);

    var out: Varyings;
    out.clip = camera.view_proj * world * vec4<f32>(corner.position, 1.0);
    out.normal = (world * vec4<f32>(corner.normal, 0.0)).xyz;
    out.tint = voxel.tint;
    return out;
}

const SUN: vec3<f32> = vec3<f32>(0.27, 0.89, 0.45);

@fragment
fn fs_lit(in: Varyings) -> @location(0) vec4<f32> {
    // Edge meshes carry zero normals; keep them at ambient.
    let n = select(vec3<f32>(0.0), normalize(in.normal), length(in.normal) > 0.0);
    let shade = 0.35 + 0.65 * max(dot(n, SUN), 0.0);
    return vec4<f32>(in.tint.rgb * shade, in.tint.a);
}

@fragment
fn fs_flat(in: Varyings) -> @location(0) vec4<f32> {
    return in.tint;
}
"#;
