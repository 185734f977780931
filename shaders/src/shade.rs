use shared::*;
use spirv_std::glam::{vec2, vec3, Vec2, Vec3, Vec3Swizzles};

// Note: This cfg is incorrect on its surface, it really should be "are we compiling with std", but
// we tie #[no_std] above to the same condition, so it's fine.
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::march::{Trace, MAX_DISTANCE, MAX_STEPS};
use crate::sdf::{normal, Material};

pub const TINT: Vec3 = Vec3::new(1.0, 3.0, 2.0);
const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

pub fn rnd(p: Vec2) -> f32 {
    (p.dot(vec2(12.9898, 78.233)).sin() * 43758.5453123).gl_fract()
}

/// One of a symmetric pair of point lights, mirrored across `x = 0` by `side`.
fn light(p: Vec3, rd: Vec3, n: Vec3, side: f32) -> Vec3 {
    let lp = vec3(4.0 * side, 3.0, -4.0);
    let to_light = lp - p;
    let l = to_light.normalize();

    let dif = 0.1 + 0.9 * saturate(n.dot(l));
    let fre = smoothstep(0.0, 1.0, 1.0 - rd.reflect(n).dot(n)).powf(4.0);
    let att = 20.0 / to_light.dot(to_light);

    TINT * (0.35 * dif + fre) * att * 0.5
}

fn portal(trace: &Trace, rd: Vec3, time: f32) -> Vec3 {
    let n = normal(trace.point, time);
    let fog = (1.0 - smoothstep(0.0, 1.0, trace.distance / MAX_DISTANCE)).powf(4.0);

    let mut col = Vec3::ZERO;
    col += light(trace.point, rd, n, 1.0);
    col += light(trace.point, rd, n, -1.0);
    col * fog
}

fn cave(trace: &Trace, time: f32) -> Vec3 {
    let mut col = Vec3::splat(trace.steps as f32 / MAX_STEPS as f32);
    col += Vec3::splat(trace.glow * trace.glow * 0.4);

    let pulse = 0.5 + 0.5 * (time * 0.8).sin();
    col += col * col * col * TINT * (0.5 + pulse);

    let lum = col.dot(LUMA);
    mix(TINT * lum, col, smoothstep(0.0, 0.25, lum))
}

/// Colors one traced pixel. The result is not clamped.
pub fn shade(trace: &Trace, ro: Vec3, rd: Vec3, uv: Vec2, time: f32) -> Vec3 {
    let mut col = match trace.material {
        Material::Portal => portal(trace, rd, time),
        Material::Cave => cave(trace, time),
    };

    // Grain against banding.
    col += Vec3::splat(0.06 * rnd(uv * time) - 0.03 - 0.005 * ro.xz().length());
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::march::march;

    #[test]
    fn rnd_is_a_unit_interval_hash() {
        let mut sum = 0.0;
        for i in 0..1000 {
            let v = rnd(vec2(i as f32 * 0.173, i as f32 * 0.031));
            assert!((0.0..1.0).contains(&v));
            sum += v;
        }
        let mean = sum / 1000.0;
        assert!((mean - 0.5).abs() < 0.1, "mean {mean}");
        assert_eq!(rnd(Vec2::ZERO), 0.0);
    }

    #[test]
    fn portal_hit_is_tinted_green() {
        let ro = vec3(0.0, 0.0, -6.5);
        let trace = march(ro, Vec3::Z, 0.0);
        let col = shade(&trace, ro, Vec3::Z, Vec2::ZERO, 0.0);
        assert!(col.y > col.z && col.z > col.x, "{col:?}");
        assert!(col.y > 0.0);
    }

    #[test]
    fn lights_are_mirror_symmetric() {
        let p = vec3(0.0, 0.5, -1.0);
        let n = vec3(0.0, 0.0, -1.0);
        let rd = Vec3::Z;
        let left = light(p, rd, n, -1.0);
        let right = light(p, rd, n, 1.0);
        assert!(left.abs_diff_eq(right, 1e-6));
    }

    #[test]
    fn far_portal_hits_fade_out() {
        let near = Trace {
            point: vec3(0.0, 0.0, -1.8),
            material: Material::Portal,
            distance: 4.0,
            steps: 10,
            glow: 0.0,
            hit: true,
        };
        let far = Trace {
            distance: 390.0,
            ..near
        };
        let near_col = portal(&near, Vec3::Z, 0.0);
        let far_col = portal(&far, Vec3::Z, 0.0);
        assert!(far_col.length() < near_col.length() * 1e-3);
    }

    #[test]
    fn long_cave_rays_are_brighter() {
        let base = Trace {
            point: Vec3::ZERO,
            material: Material::Cave,
            distance: MAX_DISTANCE,
            steps: 20,
            glow: 0.0,
            hit: false,
        };
        let deep = Trace { steps: 380, ..base };
        let lum = |t: &Trace| cave(t, 1.0).dot(LUMA);
        assert!(lum(&deep) > lum(&base));
    }

    // sin(0.8 t) is -1 at the first time and +1 at the second.
    const PULSE_LOW: f32 = 3.0 * core::f32::consts::PI / 1.6;
    const PULSE_HIGH: f32 = core::f32::consts::PI / 1.6;

    fn cave_trace(steps: u32) -> Trace {
        Trace {
            point: Vec3::ZERO,
            material: Material::Cave,
            distance: MAX_DISTANCE,
            steps,
            glow: 0.0,
            hit: false,
        }
    }

    #[test]
    fn dim_cave_takes_the_tint_hue() {
        let col = cave(&cave_trace(20), PULSE_LOW);
        assert!(col.y > col.z && col.z > col.x, "{col:?}");
        // Mostly tint: green is close to three times red.
        assert!(col.y / col.x > 2.5, "{col:?}");
    }

    #[test]
    fn bright_cave_keeps_its_own_color() {
        // steps = 400 gives col = 1, plus 1 * TINT * 0.5 with the pulse at zero.
        let col = cave(&cave_trace(MAX_STEPS), PULSE_LOW);
        assert!(col.abs_diff_eq(vec3(1.5, 2.5, 2.0), 1e-4), "{col:?}");
    }

    #[test]
    fn cave_pulses_over_time() {
        let trace = cave_trace(MAX_STEPS);
        let low = cave(&trace, PULSE_LOW);
        let high = cave(&trace, PULSE_HIGH);
        assert!(high.abs_diff_eq(vec3(2.5, 5.5, 4.0), 1e-4), "{high:?}");
        assert!(high.y > low.y);
    }
}
