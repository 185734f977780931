//! Distance field of the scene: a noise-displaced cave floor and a spinning
//! octahedron portal.

use spirv_std::glam::{vec2, vec3, Mat2, Vec2, Vec3, Vec3Swizzles};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::camera::rot;

pub const PORTAL_SIZE: f32 = 1.8;
pub const NORMAL_EPSILON: f32 = 1e-3;

const FRAC_1_SQRT_3: f32 = 0.577_350_26;
const CAVE_SCROLL_SPEED: f32 = 7.5;
const CAVE_DEPTH: f32 = 8.0;

#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum Material {
    Cave,
    Portal,
}

/// Distance to the closest surface and which surface it is.
#[derive(Copy, Clone, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Sample {
    pub distance: f32,
    pub material: Material,
}

fn noise(p: Vec2) -> f32 {
    0.5 + 0.5 * (p.x * 1.5).sin() * (p.y * 1.5).sin()
}

pub fn fbm(mut p: Vec2) -> f32 {
    // Rotates and scales by 2 between octaves.
    let m = Mat2::from_cols(vec2(1.6, -1.2), vec2(1.2, 1.6));

    let mut f = 0.0;
    f += 0.500000 * noise(p);
    p = m * p;
    f += 0.250000 * noise(p);
    p = m * p;
    f += 0.125000 * noise(p);
    p = m * p;
    f += 0.062500 * noise(p);
    p = m * p;
    f += 0.015625 * noise(p);
    f
}

/// Exact distance to an octahedron with vertices at `±s` on each axis.
pub fn octahedron(p: Vec3, s: f32) -> f32 {
    let p = p.abs();
    (p.x + p.y + p.z - s) * FRAC_1_SQRT_3
}

/// One-sided height field whose walls rise away from the `x = 0` centerline.
pub fn cave(p: Vec3, time: f32) -> f32 {
    let q = p + vec3(0.0, 0.0, time * CAVE_SCROLL_SPEED);
    let mut rock = fbm(q.xz() * 0.25);

    let way = (q.x.abs() * 38.0).powf(2.0) * 125e-6;
    rock *= way;

    (q.y - rock).max(0.0)
}

/// The portal's local frame at `time`.
pub fn portal_space(p: Vec3, time: f32) -> Vec3 {
    let mut q = p;
    let xz = rot(-time * 0.5) * q.xz();
    q.x = xz.x;
    q.z = xz.y;
    let yz = rot(time * 0.25) * q.yz();
    q.y = yz.x;
    q.z = yz.y;
    q
}

pub fn portal(p: Vec3, time: f32) -> f32 {
    octahedron(portal_space(p, time), PORTAL_SIZE)
}

pub fn map(p: Vec3, time: f32) -> Sample {
    let walls = cave(p + vec3(0.0, CAVE_DEPTH, 0.0), time) * 0.5;
    let end = portal(p, time);

    if end <= walls {
        Sample {
            distance: end,
            material: Material::Portal,
        }
    } else {
        Sample {
            distance: walls,
            material: Material::Cave,
        }
    }
}

/// Central-difference gradient of the field, normalized.
pub fn normal(p: Vec3, time: f32) -> Vec3 {
    let e = NORMAL_EPSILON;
    let dx = map(p + vec3(e, 0.0, 0.0), time).distance - map(p - vec3(e, 0.0, 0.0), time).distance;
    let dy = map(p + vec3(0.0, e, 0.0), time).distance - map(p - vec3(0.0, e, 0.0), time).distance;
    let dz = map(p + vec3(0.0, 0.0, e), time).distance - map(p - vec3(0.0, 0.0, e), time).distance;
    vec3(dx, dy, dz).normalize_or_zero()
}
