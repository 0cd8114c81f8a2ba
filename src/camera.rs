use glam::{Mat4, Vec3};

pub const FOV_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;
pub const ZOOM: f32 = 5.0;
pub const INITIAL_POSITION: Vec3 = Vec3::new(0.0, -0.2, 10.0);

/// Perspective camera with a zoom factor that narrows the field of view.
///
/// Resizes change only `aspect`; orbit controls move `position` around
/// `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub zoom: f32,
    pub aspect: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_degrees: FOV_DEGREES,
            near: NEAR,
            far: FAR,
            zoom: ZOOM,
            aspect: sanitize_aspect(aspect),
            position: INITIAL_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Vertical field of view after zoom, in radians
    pub fn effective_fov(&self) -> f32 {
        let half = (self.fov_degrees.to_radians() * 0.5).tan() / self.zoom;
        2.0 * half.atan()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.effective_fov(), self.aspect, self.near, self.far)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_narrows_fov() {
        let camera = PerspectiveCamera::new(16.0 / 9.0);
        let expected = 2.0 * ((37.5f32).to_radians().tan() / 5.0).atan();
        assert!((camera.effective_fov() - expected).abs() < 1e-6);
        assert!(camera.effective_fov() < FOV_DEGREES.to_radians());
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = PerspectiveCamera::new(0.0);
        assert_eq!(camera.aspect, 1.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect, 1.0);
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn origin_projects_near_center() {
        let camera = PerspectiveCamera::new(1.0);
        let clip = camera.view_proj_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
