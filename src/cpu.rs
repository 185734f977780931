//! Data-parallel CPU rendition of the fragment shader.

use image::RgbaImage;
use rayon::prelude::*;
use shared::glam::{vec2, Vec4};
use shared::ShaderConstants;

/// Rows per work item handed to the thread pool.
pub const TILE_ROWS: usize = 8;

/// Shrinks the frame (pointer included) to `scale` of its resolution.
pub fn scaled(constants: &ShaderConstants, scale: f32) -> ShaderConstants {
    let width = ((constants.width as f32 * scale).round() as u32).max(1);
    let height = ((constants.height as f32 * scale).round() as u32).max(1);
    let sx = width as f32 / constants.width.max(1) as f32;
    let sy = height as f32 / constants.height.max(1) as f32;
    ShaderConstants {
        width,
        height,
        pointer_x: constants.pointer_x * sx,
        pointer_y: constants.pointer_y * sy,
        ..*constants
    }
}

fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [
        c.x.round() as u8,
        c.y.round() as u8,
        c.z.round() as u8,
        c.w.round() as u8,
    ]
}

/// Renders one frame into a top-left based RGBA8 image. Pixels are written
/// unconverted, as a browser canvas would store them.
pub fn render(constants: &ShaderConstants) -> RgbaImage {
    let width = constants.width as usize;
    let mut image = RgbaImage::new(constants.width, constants.height);
    if width == 0 || constants.height == 0 {
        return image;
    }

    let row_bytes = width * 4;
    image
        .par_chunks_mut(row_bytes * TILE_ROWS)
        .enumerate()
        .for_each(|(tile, rows)| {
            for (row, pixels) in rows.chunks_mut(row_bytes).enumerate() {
                let y = tile * TILE_ROWS + row;
                for (x, pixel) in pixels.chunks_mut(4).enumerate() {
                    let frag_coord = vec2(x as f32 + 0.5, y as f32 + 0.5);
                    let color = portal_cave_shaders::fs(constants, frag_coord);
                    pixel.copy_from_slice(&to_rgba8(color));
                }
            }
        });
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_keeps_pointer_relative_position() {
        let constants = ShaderConstants {
            width: 1600,
            height: 1200,
            time: 3.0,
            pointer_x: 400.0,
            pointer_y: 900.0,
            pointer_count: 1,
        };
        let half = scaled(&constants, 0.5);
        assert_eq!((half.width, half.height), (800, 600));
        assert_eq!(half.pointer_uv(), constants.pointer_uv());
        assert_eq!(half.time, 3.0);
        assert_eq!(half.pointer_count, 1);
    }

    #[test]
    fn scaling_never_collapses_to_zero() {
        let constants = ShaderConstants {
            width: 3,
            height: 1,
            ..Default::default()
        };
        let tiny = scaled(&constants, 0.1);
        assert_eq!((tiny.width, tiny.height), (1, 1));
    }

    #[test]
    fn colors_are_clamped_and_rounded() {
        assert_eq!(to_rgba8(Vec4::new(-0.2, 0.5, 1.7, 1.0)), [0, 128, 255, 255]);
    }

    #[test]
    fn tiles_match_per_pixel_shading() {
        let constants = ShaderConstants {
            width: 24,
            height: 19,
            time: 4.0,
            ..Default::default()
        };
        let image = render(&constants);
        assert_eq!(image.dimensions(), (24, 19));
        for (x, y) in [(0, 0), (23, 0), (12, 9), (5, 18), (23, 18)] {
            let expected = portal_cave_shaders::fs(&constants, vec2(x as f32 + 0.5, y as f32 + 0.5));
            assert_eq!(image.get_pixel(x, y).0, to_rgba8(expected));
        }
    }

    #[test]
    fn empty_frame_renders_nothing() {
        let image = render(&ShaderConstants::default());
        assert_eq!(image.dimensions(), (0, 0));
    }
}
