use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::camera::PerspectiveCamera;

pub const DAMPING_FACTOR: f32 = 0.05;
const ZOOM_STEP: f32 = 0.95;
const POLAR_EPSILON: f32 = 1e-6;

/// Orbit controls with damped rotation around the camera target
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            enable_damping: true,
            damping_factor: DAMPING_FACTOR,
            rotate_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
        }
    }

    /// Pointer drag in physical pixels over a viewport of `height` pixels
    pub fn drag(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.theta_delta -= TAU * dx / height * self.rotate_speed;
        self.phi_delta -= TAU * dy / height * self.rotate_speed;
    }

    /// Wheel steps; positive moves away from the target
    pub fn wheel(&mut self, steps: f32) {
        if steps > 0.0 {
            self.scale /= ZOOM_STEP.powf(steps);
        } else if steps < 0.0 {
            self.scale *= ZOOM_STEP.powf(-steps);
        }
    }

    /// True while damped motion is still settling
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > 1e-6 || self.phi_delta.abs() > 1e-6 || self.scale != 1.0
    }

    /// Apply accumulated input to the camera; returns whether it moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.is_moving() {
            return false;
        }
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius == 0.0 {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.theta_delta * step;
        phi = (phi + self.phi_delta * step).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let next = camera.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.scale = 1.0;

        let moved = (next - camera.position).length_squared() > 1e-12;
        camera.position = next;
        moved
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_update_keeps_camera() {
        let mut camera = PerspectiveCamera::new(1.0);
        let before = camera.position;
        let mut controls = OrbitControls::new();
        assert!(!controls.update(&mut camera));
        assert!((camera.position - before).length() < 1e-5);
    }

    #[test]
    fn drag_rotates_gradually() {
        let mut camera = PerspectiveCamera::new(1.0);
        let mut controls = OrbitControls::new();
        controls.drag(100.0, 0.0, 800.0);

        assert!(controls.update(&mut camera));
        let first = camera.position;
        assert!(controls.is_moving());
        for _ in 0..400 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
        // Orbit preserves distance to target
        assert!((camera.position.length() - first.length()).abs() < 1e-3);
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn wheel_dollies() {
        let mut camera = PerspectiveCamera::new(1.0);
        let start = camera.position.length();
        let mut controls = OrbitControls::new();
        controls.wheel(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - start * ZOOM_STEP).abs() < 1e-4);
    }
}
