//! CPU reference of the particle shader math.
//!
//! These functions compute exactly what `shader::PARTICLE_SHADER` computes
//! per particle and per fragment, so the displacement, sizing and masking
//! rules can be unit tested without a GPU. Texture reads are passed in as
//! already-sampled values.

use glam::{Mat4, Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

use crate::uniforms::RenderParams;

/// Scale of the trail-driven push, in grid units.
pub const TRAIL_PUSH: f32 = 40.0;

/// Inner edge of the fragment mask.
pub const MASK_BORDER: f32 = 0.3;

/// Quad corner positions, indexed by vertex.
pub const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
];

/// Quad corner texture coordinates, indexed by vertex.
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Two triangles over the four quad corners.
pub const QUAD_INDICES: [u16; 6] = [0, 2, 1, 2, 3, 1];

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn fract3(v: Vec3) -> Vec3 {
    v - v.floor()
}

fn mod289_2(x: Vec2) -> Vec2 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec3) -> Vec3 {
    mod289_3(((x * 34.0) + 1.0) * x)
}

/// Hash of a scalar into `[0, 1)`.
pub fn random(n: f32) -> f32 {
    fract(n.sin() * 43_758.547)
}

/// 2D simplex noise, roughly in `[-1, 1]`.
pub fn snoise(v: Vec2) -> f32 {
    const C: Vec4 = Vec4::new(
        0.211_324_87,  // (3 - sqrt(3)) / 6
        0.366_025_4,   // (sqrt(3) - 1) / 2
        -0.577_350_26, // -1 + 2 * C.x
        0.024_390_243, // 1 / 41
    );

    let mut i = (v + Vec2::splat(v.dot(Vec2::splat(C.y)))).floor();
    let x0 = v - i + Vec2::splat(i.dot(Vec2::splat(C.x)));

    let i1 = if x0.x > x0.y {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(0.0, 1.0)
    };
    let mut x12 = Vec4::new(x0.x, x0.y, x0.x, x0.y) + Vec4::new(C.x, C.x, C.z, C.z);
    x12.x -= i1.x;
    x12.y -= i1.y;

    i = mod289_2(i);
    let p = permute(
        permute(Vec3::splat(i.y) + Vec3::new(0.0, i1.y, 1.0)) + Vec3::splat(i.x)
            + Vec3::new(0.0, i1.x, 1.0),
    );

    let mut m = (Vec3::splat(0.5)
        - Vec3::new(x0.dot(x0), x12.xy().dot(x12.xy()), x12.zw().dot(x12.zw())))
    .max(Vec3::ZERO);
    m *= m;
    m *= m;

    let x = 2.0 * fract3(p * C.w) - 1.0;
    let h = x.abs() - 0.5;
    let ox = (x + 0.5).floor();
    let a0 = x - ox;
    m *= Vec3::splat(1.792_842_9) - 0.853_734_7 * (a0 * a0 + h * h);

    let g = Vec3::new(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x12.x + h.y * x12.y,
        a0.z * x12.z + h.z * x12.w,
    );
    130.0 * m.dot(g)
}

/// Perceptual luminance of a sampled color.
pub fn luminance(rgb: Vec3) -> f32 {
    rgb.x * 0.21 + rgb.y * 0.71 + rgb.z * 0.07
}

/// Texture coordinate of a particle's source pixel.
pub fn particle_uv(offset: Vec3, params: &RenderParams) -> Vec2 {
    offset.xy() / params.texture_size
}

/// Combined random/noise value driving depth and trail response.
pub fn depth_noise(pindex: f32, time: f32) -> f32 {
    random(pindex) + snoise(Vec2::new(pindex * 0.1, time * 0.1))
}

/// Displaced, centred particle position.
///
/// `trail` is the red channel of the trail texture at the particle's UV.
pub fn displace(offset: Vec3, angle: f32, pindex: f32, trail: f32, params: &RenderParams) -> Vec3 {
    let mut displaced = offset;

    let jitter = Vec2::new(random(pindex) - 0.5, random(offset.x + pindex) - 0.5) * params.random;
    displaced.x += jitter.x;
    displaced.y += jitter.y;

    let rndz = depth_noise(pindex, params.time);
    displaced.z += rndz * (random(pindex) * 2.0 * params.depth);

    displaced.x -= params.texture_size.x * 0.5;
    displaced.y -= params.texture_size.y * 0.5;

    displaced.z += trail * -TRAIL_PUSH * rndz;
    displaced.x += angle.cos() * trail * TRAIL_PUSH * rndz;
    displaced.y += angle.sin() * trail * TRAIL_PUSH * rndz;

    displaced
}

/// Point size; dim pixels render smaller.
pub fn point_size(pindex: f32, grey: f32, params: &RenderParams) -> f32 {
    let mut psize = snoise(Vec2::new(params.time, pindex) * 0.5) + 2.0;
    psize *= grey.max(0.2);
    psize * params.size
}

/// Clip-space position of one quad corner.
pub fn corner_clip(
    displaced: Vec3,
    corner: Vec3,
    psize: f32,
    model_view: Mat4,
    projection: Mat4,
) -> Vec4 {
    let mut mv = model_view * displaced.extend(1.0);
    let grown = mv.xyz() + corner * psize;
    mv = grown.extend(mv.w);
    projection * mv
}

/// Hermite step with the edges taken literally, including `edge0 > edge1`.
pub fn mask_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fragment alpha at sprite coordinate `uv` (corners span `[0, 1]`).
pub fn fragment_alpha(uv: Vec2, params: &RenderParams) -> f32 {
    let radius = 0.5;
    let dist = radius - uv.distance(Vec2::splat(0.5));
    (mask_step(params.circle_or_square, MASK_BORDER, dist) - params.alpha_circle).max(0.0)
}
