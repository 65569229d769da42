//! WGSL source and vertex layouts for the particle pipeline.
//!
//! Each particle is an instanced quad. Slot 0 carries the shared quad
//! corners, slot 1 the per-particle [`ParticleInstance`] records. The vertex
//! stage displaces the quad from its grid position; the fragment stage masks
//! it into a soft circle or a near-opaque square.
//!
//! The math here is mirrored on the CPU by [`crate::kernel`].

use bytemuck::{Pod, Zeroable};

use crate::kernel::{QUAD_POSITIONS, QUAD_UVS};
use crate::particles::ParticleInstance;

/// Bind group 0: uniforms, scene texture, trail texture, sampler.
pub const PARTICLE_SHADER: &str = r#"
struct Uniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    texture_size: vec2<f32>,
    time: f32,
    random: f32,
    depth: f32,
    size: f32,
    alpha_circle: f32,
    alpha_square: f32,
    circle_or_square: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var scene_texture: texture_2d<f32>;
@group(0) @binding(2) var trail_texture: texture_2d<f32>;
@group(0) @binding(3) var texture_sampler: sampler;

const TRAIL_PUSH: f32 = 40.0;
const MASK_BORDER: f32 = 0.3;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) offset: vec3<f32>,
    @location(3) angle: f32,
    @location(4) pindex: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
};

fn random(n: f32) -> f32 {
    return fract(sin(n) * 43758.5453123);
}

fn mod289_2(x: vec2<f32>) -> vec2<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute(x: vec3<f32>) -> vec3<f32> {
    return mod289_3(((x * 34.0) + 1.0) * x);
}

fn snoise(v: vec2<f32>) -> f32 {
    let C = vec4<f32>(
        0.211324865405187,
        0.366025403784439,
        -0.577350269189626,
        0.024390243902439
    );

    var i = floor(v + dot(v, C.yy));
    let x0 = v - i + dot(i, C.xx);

    let i1 = select(vec2<f32>(0.0, 1.0), vec2<f32>(1.0, 0.0), x0.x > x0.y);
    var x12 = x0.xyxy + C.xxzz;
    x12.x = x12.x - i1.x;
    x12.y = x12.y - i1.y;

    i = mod289_2(i);
    let p = permute(
        permute(i.y + vec3<f32>(0.0, i1.y, 1.0)) + i.x + vec3<f32>(0.0, i1.x, 1.0)
    );

    var m = max(
        vec3<f32>(0.5) - vec3<f32>(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)),
        vec3<f32>(0.0)
    );
    m = m * m;
    m = m * m;

    let x = 2.0 * fract(p * C.www) - 1.0;
    let h = abs(x) - 0.5;
    let ox = floor(x + 0.5);
    let a0 = x - ox;
    m = m * (1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h));

    let g = vec3<f32>(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x12.x + h.y * x12.y,
        a0.z * x12.z + h.z * x12.w
    );
    return 130.0 * dot(m, g);
}

// Hermite step that honours edge0 > edge1.
fn mask_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    let puv = input.offset.xy / uniforms.texture_size;
    let color = textureSampleLevel(scene_texture, texture_sampler, puv, 0.0);
    let grey = color.r * 0.21 + color.g * 0.71 + color.b * 0.07;

    var displaced = input.offset;
    displaced.x = displaced.x + (random(input.pindex) - 0.5) * uniforms.random;
    displaced.y = displaced.y + (random(input.offset.x + input.pindex) - 0.5) * uniforms.random;

    let rndz = random(input.pindex) + snoise(vec2<f32>(input.pindex * 0.1, uniforms.time * 0.1));
    displaced.z = displaced.z + rndz * (random(input.pindex) * 2.0 * uniforms.depth);

    displaced.x = displaced.x - uniforms.texture_size.x * 0.5;
    displaced.y = displaced.y - uniforms.texture_size.y * 0.5;

    let trail = textureSampleLevel(trail_texture, texture_sampler, puv, 0.0).r;
    displaced.z = displaced.z + trail * -TRAIL_PUSH * rndz;
    displaced.x = displaced.x + cos(input.angle) * trail * TRAIL_PUSH * rndz;
    displaced.y = displaced.y + sin(input.angle) * trail * TRAIL_PUSH * rndz;

    var psize = snoise(vec2<f32>(uniforms.time, input.pindex) * 0.5) + 2.0;
    psize = psize * max(grey, 0.2) * uniforms.size;

    var mv = uniforms.model_view * vec4<f32>(displaced, 1.0);
    mv = vec4<f32>(mv.xyz + input.position * psize, mv.w);

    var out: VertexOutput;
    out.clip_position = uniforms.projection * mv;
    out.uv = input.uv;
    out.color = color.rgb;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let dist = 0.5 - distance(input.uv, vec2<f32>(0.5, 0.5));
    let t = mask_step(uniforms.circle_or_square, MASK_BORDER, dist);
    return vec4<f32>(input.color, max(t - uniforms.alpha_circle, 0.0));
}
"#;

/// One corner of the shared particle quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// The four quad corners, in index order.
pub fn quad_vertices() -> [QuadVertex; 4] {
    let mut out = [QuadVertex {
        position: [0.0; 3],
        uv: [0.0; 2],
    }; 4];
    for (i, v) in out.iter_mut().enumerate() {
        v.position = QUAD_POSITIONS[i];
        v.uv = QUAD_UVS[i];
    }
    out
}

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32, 4 => Float32];

/// Layout of vertex buffer slot 0.
pub fn quad_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

/// Layout of vertex buffer slot 1.
pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}
