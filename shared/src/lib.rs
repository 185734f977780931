//! Types and GLSL-flavoured helpers shared between the host and the shader crate.

#![cfg_attr(target_arch = "spirv", no_std)]

use core::ops::{Add, Mul, Sub};

pub use spirv_std::glam;

use glam::{vec2, vec3, Vec2, Vec3};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// Per-frame push constants. Pointer coordinates are in physical pixels with
/// the origin at the bottom-left corner of the surface.
#[derive(Copy, Clone, Default, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct ShaderConstants {
    pub width: u32,
    pub height: u32,
    pub time: f32,
    pub pointer_x: f32,
    pub pointer_y: f32,
    pub pointer_count: u32,
}

impl ShaderConstants {
    pub fn resolution(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }

    pub fn pointer_active(&self) -> bool {
        self.pointer_count > 0
    }

    /// Pointer position normalized to `0..1` on both axes.
    pub fn pointer_uv(&self) -> Vec2 {
        vec2(self.pointer_x, self.pointer_y) / self.resolution()
    }
}

pub fn saturate(x: f32) -> f32 {
    x.max(0.0).min(1.0)
}

pub fn pow(v: Vec3, power: f32) -> Vec3 {
    vec3(v.x.powf(power), v.y.powf(power), v.z.powf(power))
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    // Scale, bias and saturate x to 0..1 range
    let x = saturate((x - edge0) / (edge1 - edge0));
    // Evaluate polynomial
    x * x * (3.0 - 2.0 * x)
}

pub fn mix<X: Copy + Mul<A, Output = X> + Add<Output = X> + Sub<Output = X>, A: Copy>(
    x: X,
    y: X,
    a: A,
) -> X {
    x - x * a + y * a
}

pub trait FloatExt {
    fn gl_fract(self) -> Self;
}

impl FloatExt for f32 {
    fn gl_fract(self) -> f32 {
        self - self.floor()
    }
}

pub trait VecExt {
    fn reflect(self, normal: Self) -> Self;
}

impl VecExt for Vec3 {
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * normal.dot(self) * normal
    }
}
