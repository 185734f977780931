//! Sphere tracing through the scene's distance field.

use spirv_std::glam::Vec3;

use crate::sdf::{map, Material};

pub const MAX_STEPS: u32 = 400;
pub const MAX_DISTANCE: f32 = 400.0;
pub const HIT_EPSILON: f32 = 1e-3;
const GLOW_GAIN: f32 = 5e-2;

#[derive(Copy, Clone)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Trace {
    /// Last evaluated point along the ray.
    pub point: Vec3,
    /// Material of the surface closest to `point`.
    pub material: Material,
    /// Travelled distance, clamped to `MAX_DISTANCE`.
    pub distance: f32,
    pub steps: u32,
    /// Accumulated `1 / distance²` brightness along the ray.
    pub glow: f32,
    pub hit: bool,
}

pub fn march(ro: Vec3, rd: Vec3, time: f32) -> Trace {
    let mut p = ro;
    let mut dd = 0.0;
    let mut glow = 0.0;
    let mut material = Material::Cave;
    let mut hit = false;

    let mut i = 0;
    while i < MAX_STEPS {
        let sample = map(p, time);
        material = sample.material;
        if sample.distance < HIT_EPSILON {
            hit = true;
            break;
        }
        if dd > MAX_DISTANCE {
            dd = MAX_DISTANCE;
            break;
        }
        p += rd * sample.distance;
        dd += sample.distance;
        glow += GLOW_GAIN / (dd * dd);
        i += 1;
    }

    Trace {
        point: p,
        material,
        distance: dd.min(MAX_DISTANCE),
        steps: i,
        glow,
        hit,
    }
}
