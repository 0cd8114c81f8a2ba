//! CPU reference of the ribbon vertex stage.
//!
//! `shaders/ribbon.wgsl` runs the same math per vertex every frame; nothing
//! here is called on the render path.

use glam::{Vec2, Vec3};

use crate::math::{noise2, RIBBON_PERIOD};
use crate::types::FrameParams;

/// Displaced position and reconstructed normal of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Height-displace a base position at the params' current time
pub fn displace(pos: Vec3, params: &FrameParams) -> Vec3 {
    let scale = params.noise_scale();
    let sample = Vec2::new(
        pos.x * scale.x + params.noise_translate_speed * params.time,
        pos.z * scale.y,
    );
    let (d, _) = noise2(sample, RIBBON_PERIOD, params.time * params.noise_speed);
    Vec3::new(
        pos.x,
        pos.y + d * params.noise_amp + pos.x * params.incline[0],
        pos.z,
    )
}

/// Displace a vertex and rebuild its normal by finite differences along the
/// tangent and bitangent, `offset` apart.
pub fn displace_vertex(pos: Vec3, normal: Vec3, tangent: Vec3, params: &FrameParams) -> DisplacedVertex {
    let bitangent = tangent.cross(normal);
    let displaced = displace(pos, params);
    let along_tangent = displace(pos - tangent * params.offset, params);
    let along_bitangent = displace(pos - bitangent * params.offset, params);

    let normal = (along_bitangent - displaced)
        .normalize()
        .cross((along_tangent - displaced).normalize());

    DisplacedVertex {
        position: displaced,
        normal,
    }
}
