//! CPU reference of the environment and ribbon fragment stages

use glam::{Vec2, Vec3, Vec4};

use crate::math::{mix, noise3};
use crate::types::FrameParams;

const UP: Vec3 = Vec3::Y;

/// GLSL `reflect`: `i` about a unit normal `n`
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

/// Environment texture coordinate for a view-space point and normal.
///
/// Sphere-map style projection of the reflection vector onto the unit disc,
/// in bottom-left origin convention; the shader flips `v` for wgpu targets.
pub fn reflection_uv(view_position: Vec3, view_normal: Vec3) -> Vec2 {
    let e = view_position.normalize();
    let n = view_normal.normalize();
    let r = reflect(e, n);
    let m = 2.0 * (r.x * r.x + r.y * r.y + (r.z + 1.0) * (r.z + 1.0)).sqrt();
    Vec2::new(r.x, r.y) / m + Vec2::splat(0.5)
}

/// How far a fragment is pushed toward white, from its facing against +Y
pub fn edge_whiteness(normal: Vec3, params: &FrameParams) -> f32 {
    let facing = normal.dot(UP).abs().powi(10);
    mix(params.edge_reflection_min, params.edge_reflection_max, facing)
}

/// Blend an environment sample toward opaque white
pub fn blend_to_white(base: Vec4, amount: f32) -> Vec4 {
    base.lerp(Vec4::ONE, amount)
}

/// Color ramp coordinate painted by the environment pass at a world point
pub fn gradient_ramp_coordinate(world: Vec3, params: &FrameParams) -> f32 {
    let t = params.time;
    let grain_scale = params.gradient_grain_scale();
    let grain_offset = params.gradient_grain_offset();
    let scale = params.gradient_scale();
    let speed = params.gradient_noise_speed();

    let grain = noise3(Vec3::new(
        world.x * grain_scale.x + 100.0,
        world.y * grain_scale.y + 50.0,
        t * 0.01,
    ));

    let n = noise3(Vec3::new(
        world.x * scale.x + t * speed.x + grain * grain_offset.x,
        world.y * scale.y + t * speed.y + grain * grain_offset.y,
        world.z * scale.z + t * speed.z,
    ));

    mix(params.gradient_ramp_min, params.gradient_ramp_max, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShaderSettings;

    fn params() -> FrameParams {
        FrameParams::new(&ShaderSettings::default(), 0.2)
    }

    #[test]
    fn head_on_view_hits_center() {
        // Looking straight down -Z at a surface facing the camera
        let uv = reflection_uv(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!((uv - Vec2::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn reflection_uv_stays_in_unit_square() {
        for i in 0..64 {
            let a = i as f32 * 0.37;
            let normal = Vec3::new(a.cos(), a.sin(), 0.5 + (a * 0.5).sin()).normalize();
            let uv = reflection_uv(Vec3::new(a.sin(), 0.3, -4.0), normal);
            assert!(uv.x >= 0.0 && uv.x <= 1.0, "{uv}");
            assert!(uv.y >= 0.0 && uv.y <= 1.0, "{uv}");
        }
    }

    #[test]
    fn up_facing_is_fully_white() {
        let p = params();
        assert_eq!(edge_whiteness(Vec3::Y, &p), 1.0);
        assert_eq!(edge_whiteness(-Vec3::Y, &p), 1.0);
        assert_eq!(edge_whiteness(Vec3::X, &p), 0.0);
        let c = blend_to_white(Vec4::new(0.2, 0.1, 0.0, 0.0), edge_whiteness(Vec3::Y, &p));
        assert!(c.abs_diff_eq(Vec4::ONE, 1e-6));
    }

    #[test]
    fn falloff_is_steep() {
        let p = params();
        let tilted = Vec3::new(1.0, 1.0, 0.0).normalize();
        // cos(45deg)^10 = 1/32
        assert!((edge_whiteness(tilted, &p) - 1.0 / 32.0).abs() < 1e-4);
    }

    #[test]
    fn ramp_coordinate_follows_remap() {
        let p = params();
        for i in 0..32 {
            let w = Vec3::new(i as f32 * 0.6 - 10.0, (i % 7) as f32 - 3.0, -5.0);
            let u = gradient_ramp_coordinate(w, &p);
            // n in [-1.1, 1.1] mapped through mix(0.5, -0.3, n)
            assert!(u > -0.5 && u < 1.4, "{u}");
        }
    }
}
