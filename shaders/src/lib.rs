//! Raymarched cave scrolling towards a spinning octahedron portal.

#![cfg_attr(target_arch = "spirv", no_std)]

use shared::*;
use spirv_std::glam::{vec2, Vec2, Vec3, Vec4};
use spirv_std::spirv;

pub mod camera;
pub mod march;
pub mod sdf;
pub mod shade;

use camera::{orient, ray_direction, ray_origin, screen_uv};
use march::march;
use shade::shade;

#[derive(Copy, Clone)]
pub struct Inputs {
    pub resolution: Vec2,
    pub time: f32,
    pub pointer_active: bool,
    /// Normalized pointer position, ignored unless `pointer_active`.
    pub pointer: Vec2,
}

impl Inputs {
    pub fn from_constants(constants: &ShaderConstants) -> Self {
        Inputs {
            resolution: constants.resolution(),
            time: constants.time,
            pointer_active: constants.pointer_active(),
            pointer: constants.pointer_uv(),
        }
    }

    /// `frag_coord` has its origin at the bottom-left corner.
    pub fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let uv = screen_uv(frag_coord, self.resolution);

        let ro = orient(
            ray_origin(self.pointer_active, self.time),
            self.pointer_active,
            self.pointer,
            self.time,
        );
        let rd = orient(
            ray_direction(uv),
            self.pointer_active,
            self.pointer,
            self.time,
        );

        let trace = march(ro, rd, self.time);
        let col = shade(&trace, ro, rd, uv, self.time);

        *frag_color = col.extend(1.0);
    }
}

/// Shades one pixel given a top-left based `frag_coord`, as handed out by
/// both the rasterizer and the CPU renderer.
pub fn fs(constants: &ShaderConstants, mut frag_coord: Vec2) -> Vec4 {
    frag_coord.y = constants.height as f32 - frag_coord.y;

    let mut color = Vec4::ZERO;
    Inputs::from_constants(constants).main_image(&mut color, frag_coord);
    color
}

#[spirv(fragment)]
pub fn main_fs(
    #[spirv(frag_coord)] in_frag_coord: Vec4,
    #[spirv(push_constant)] constants: &ShaderConstants,
    output: &mut Vec4,
) {
    let frag_coord = vec2(in_frag_coord.x, in_frag_coord.y);
    let color = fs(constants, frag_coord);
    // The swapchain is sRGB; undo its encoding so the image matches an
    // unmanaged canvas.
    *output = pow(color.truncate().max(Vec3::ZERO), 2.2).extend(color.w);
}

#[spirv(vertex)]
pub fn main_vs(#[spirv(vertex_index)] vert_idx: i32, #[spirv(position)] builtin_pos: &mut Vec4) {
    // Create a "full screen triangle" by mapping the vertex index.
    // ported from https://www.saschawillems.de/blog/2016/08/13/vulkan-tutorial-on-rendering-a-fullscreen-quad-without-buffers/
    let uv = vec2(((vert_idx << 1) & 2) as f32, (vert_idx & 2) as f32);
    let pos = 2.0 * uv - Vec2::ONE;

    *builtin_pos = pos.extend(0.0).extend(1.0);
}
