use glam::{Mat4, Vec3, Vec4};

use crate::camera::PerspectiveCamera;

use crate::mesh::{fold_ribbon, MeshData};

pub const RIBBON_WIDTH: f32 = 8.0;
pub const RIBBON_HEIGHT: f32 = 10.0;
pub const RIBBON_SEGMENTS_PER_UNIT: u32 = 40;

pub const ENVIRONMENT_SIZE: f32 = 20.0;
pub const ENVIRONMENT_DEPTH: f32 = -5.0;

/// Full-screen gradient plane painted by the environment pass
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentPlane {
    pub mesh: MeshData,
    pub translation: Vec3,
}

impl EnvironmentPlane {
    pub fn new() -> Self {
        Self {
            mesh: MeshData::plane(ENVIRONMENT_SIZE, ENVIRONMENT_SIZE, 1, 1),
            translation: Vec3::new(0.0, 0.0, ENVIRONMENT_DEPTH),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
    }

    /// World point the gradient noise is evaluated at
    pub fn noise_position(&self, position: Vec3) -> Vec3 {
        self.model_matrix().transform_point3(position)
    }

    /// Clip position of a plane vertex; the model offset is not applied here
    pub fn clip_position(&self, position: Vec3, camera: &PerspectiveCamera) -> Vec4 {
        camera.view_proj_matrix() * position.extend(1.0)
    }
}

impl Default for EnvironmentPlane {
    fn default() -> Self {
        Self::new()
    }
}

/// Both scenes, built once at mount and handed to the renderer for upload
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSet {
    pub ribbon: MeshData,
    pub environment: EnvironmentPlane,
}

impl SceneSet {
    /// Folded ribbon at full density plus the environment plane
    pub fn build() -> Self {
        Self::with_density(RIBBON_SEGMENTS_PER_UNIT)
    }

    /// Same layout at a chosen grid density, segments per world unit
    pub fn with_density(segments_per_unit: u32) -> Self {
        let mut ribbon = MeshData::plane(
            RIBBON_WIDTH,
            RIBBON_HEIGHT,
            RIBBON_WIDTH as u32 * segments_per_unit,
            RIBBON_HEIGHT as u32 * segments_per_unit,
        );
        fold_ribbon(&mut ribbon);

        Self {
            ribbon,
            environment: EnvironmentPlane::new(),
        }
    }

    pub fn ribbon_model_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_density_ribbon_needs_u32_indices() {
        let scenes = SceneSet::build();
        assert_eq!(scenes.ribbon.vertex_count(), 321 * 401);
        assert!(scenes.ribbon.vertex_count() > u16::MAX as usize);
    }

    #[test]
    fn environment_sits_behind_origin() {
        let plane = EnvironmentPlane::new();
        let p = plane.model_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(plane.mesh.indices.len(), 6);
    }

    #[test]
    fn environment_draws_untranslated() {
        let plane = EnvironmentPlane::new();
        let camera = PerspectiveCamera::new(16.0 / 9.0);

        let corner = Vec3::new(10.0, 10.0, 0.0);
        let clip = plane.clip_position(corner, &camera);
        let expected = camera.projection_matrix() * camera.view_matrix() * corner.extend(1.0);
        assert!(clip.abs_diff_eq(expected, 1e-4));

        // Plane center stays at the orbit target distance, not five units further
        let center = plane.clip_position(Vec3::ZERO, &camera);
        assert!((center.w - camera.position.length()).abs() < 1e-3);
    }

    #[test]
    fn environment_noise_uses_offset_position() {
        let plane = EnvironmentPlane::new();
        let p = plane.noise_position(Vec3::new(2.0, -3.0, 0.0));
        assert_eq!(p, Vec3::new(2.0, -3.0, -5.0));
    }
}
