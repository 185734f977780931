use core::f32::consts::{FRAC_PI_2, PI, TAU};
use spirv_std::glam::{vec2, vec3, Mat2, Vec2, Vec3, Vec3Swizzles};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

pub const ORIGIN_DISTANCE: f32 = 4.5;
pub const IDLE_DOLLY: f32 = 2.0;

/// Counter-clockwise rotation by `a` radians.
pub fn rot(a: f32) -> Mat2 {
    let c = a.cos();
    let s = a.sin();
    Mat2::from_cols(vec2(c, s), vec2(-s, c))
}

fn rotate_yz(v: Vec3, a: f32) -> Vec3 {
    let yz = rot(a) * v.yz();
    vec3(v.x, yz.x, yz.y)
}

fn rotate_xz(v: Vec3, a: f32) -> Vec3 {
    let xz = rot(a) * v.xz();
    vec3(xz.x, v.y, xz.y)
}

fn rotate_xy(v: Vec3, a: f32) -> Vec3 {
    (rot(a) * v.xy()).extend(v.z)
}

/// Rotates `v` into camera orientation. With a pointer down the camera orbits
/// under manual control, otherwise it tumbles slowly over time.
pub fn orient(v: Vec3, pointer_active: bool, pointer: Vec2, time: f32) -> Vec3 {
    if pointer_active {
        let pitch = pointer.y * PI - FRAC_PI_2;
        let yaw = pointer.x * TAU - PI;
        rotate_xz(rotate_yz(v, pitch), yaw)
    } else {
        let pitch = (time * 0.3).sin() * 0.3;
        let yaw = (time * 0.2).sin() * 0.6;
        let roll = (time * 0.15).sin() * 0.2;
        rotate_xy(rotate_xz(rotate_yz(v, pitch), yaw), roll)
    }
}

/// Camera position before orientation. The idle camera breathes in and out
/// along the view axis.
pub fn ray_origin(pointer_active: bool, time: f32) -> Vec3 {
    let mut z = -ORIGIN_DISTANCE;
    if !pointer_active {
        z -= IDLE_DOLLY * ((time * 0.2).cos() - 1.0).exp();
    }
    vec3(0.0, 0.0, z)
}

/// Aspect-correct screen coordinate, `0` at the center and `±0.5` along the
/// shorter edge.
pub fn screen_uv(frag_coord: Vec2, resolution: Vec2) -> Vec2 {
    (frag_coord - 0.5 * resolution) / resolution.x.min(resolution.y)
}

pub fn ray_direction(uv: Vec2) -> Vec3 {
    uv.extend(1.0).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn idle_origin_at_start() {
        assert_close(ray_origin(false, 0.0), vec3(0.0, 0.0, -6.5));
        let oriented = orient(ray_origin(false, 0.0), false, Vec2::ZERO, 0.0);
        assert_close(oriented, vec3(0.0, 0.0, -6.5));
    }

    #[test]
    fn pointer_origin_has_no_dolly() {
        for time in [0.0, 12.0, 90.0] {
            assert_close(ray_origin(true, time), vec3(0.0, 0.0, -4.5));
        }
    }

    #[test]
    fn idle_dolly_stays_between_bounds() {
        let mut time = 0.0;
        while time < 180.0 {
            let z = ray_origin(false, time).z;
            assert!(z <= -4.5 && z >= -6.5 - 1e-5, "z = {z} at {time}");
            time += 0.37;
        }
    }

    #[test]
    fn centered_pointer_faces_forward() {
        let v = vec3(0.3, -0.2, 1.0);
        for time in [0.0, 5.0, 100.0] {
            assert_close(orient(v, true, vec2(0.5, 0.5), time), v);
        }
    }

    #[test]
    fn pointer_orientation_ignores_time() {
        let v = vec3(0.1, 0.4, -4.5);
        let pointer = vec2(0.2, 0.9);
        let first = orient(v, true, pointer, 0.0);
        for time in [1.0, 33.3, 179.0] {
            assert_close(orient(v, true, pointer, time), first);
        }
    }

    #[test]
    fn idle_orientation_ignores_stale_pointer() {
        let v = vec3(0.1, 0.4, -4.5);
        for time in [0.0, 2.5, 61.0] {
            let a = orient(v, false, Vec2::ZERO, time);
            let b = orient(v, false, vec2(0.9, 0.1), time);
            assert_eq!(a, b);
        }
        assert_ne!(orient(v, false, Vec2::ZERO, 3.0), orient(v, false, Vec2::ZERO, 4.0));
    }

    #[test]
    fn pointer_edges_sweep_half_turns() {
        // x = 0 yaws by -π: forward becomes backward.
        assert_close(orient(Vec3::Z, true, vec2(0.0, 0.5), 0.0), Vec3::NEG_Z);
        // y = 1 pitches by π/2.
        assert_close(orient(Vec3::Z, true, vec2(0.5, 1.0), 0.0), Vec3::NEG_Y);
    }

    #[test]
    fn orientation_is_rigid() {
        let a = vec3(0.3, -1.0, 2.0);
        let b = vec3(-4.0, 0.5, 1.0);
        for (active, pointer, time) in [(false, Vec2::ZERO, 17.0), (true, vec2(0.7, 0.3), 0.0)] {
            let ra = orient(a, active, pointer, time);
            let rb = orient(b, active, pointer, time);
            assert!((ra.distance(rb) - a.distance(b)).abs() < 1e-4);
            assert!((ra.dot(rb) - a.dot(b)).abs() < 1e-4);
        }
    }

    #[test]
    fn uv_depends_only_on_relative_position() {
        let small = vec2(800.0, 600.0);
        let large = vec2(1600.0, 1200.0);
        for frag in [vec2(0.0, 0.0), vec2(400.0, 300.0), vec2(123.0, 456.0), vec2(799.0, 1.0)] {
            let a = screen_uv(frag, small);
            let b = screen_uv(frag * 2.0, large);
            assert!(a.abs_diff_eq(b, 1e-6));
        }
        assert_eq!(screen_uv(vec2(400.0, 300.0), small), Vec2::ZERO);
        assert_eq!(screen_uv(vec2(400.0, 600.0), small), vec2(0.0, 0.5));
    }
}
