use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::config::ShaderSettings;

/// Shared uniform block read by both the environment and ribbon pipelines.
///
/// Field order matches `FrameParams` in the WGSL sources; vec3 members are
/// followed by a scalar so the std140-style layout needs no explicit padding.
/// Only `time` changes after construction.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameParams {
    pub time: f32,
    pub noise_amp: f32,
    pub noise_speed: f32,
    pub offset: f32,
    pub noise_scale: [f32; 2],
    pub noise_translate_speed: f32,
    pub edge_reflection_min: f32,
    pub incline: [f32; 3],
    pub edge_reflection_max: f32,
    pub gradient_scale: [f32; 3],
    pub gradient_ramp_min: f32,
    pub gradient_noise_speed: [f32; 3],
    pub gradient_ramp_max: f32,
    pub gradient_grain_scale: [f32; 2],
    pub gradient_grain_offset: [f32; 2],
}

impl FrameParams {
    /// Build the fixed parameter set; `time` starts at zero
    pub fn new(settings: &ShaderSettings, incline: f32) -> Self {
        Self {
            time: 0.0,
            noise_amp: settings.noise_amp,
            noise_speed: settings.noise_speed,
            offset: settings.normal_offset,
            noise_scale: settings.noise_scale,
            noise_translate_speed: settings.noise_translate_speed,
            edge_reflection_min: settings.edge_reflection_min,
            incline: [incline, 0.0, 0.0],
            edge_reflection_max: settings.edge_reflection_max,
            gradient_scale: settings.gradient_scale,
            gradient_ramp_min: settings.gradient_ramp_min,
            gradient_noise_speed: settings.gradient_noise_speed,
            gradient_ramp_max: settings.gradient_ramp_max,
            gradient_grain_scale: settings.gradient_grain_scale,
            gradient_grain_offset: settings.gradient_grain_offset,
        }
    }

    /// Same parameters at a new time, in seconds
    pub fn with_time(self, time: f32) -> Self {
        Self { time, ..self }
    }

    pub fn noise_scale(&self) -> Vec2 {
        Vec2::from_array(self.noise_scale)
    }

    pub fn incline(&self) -> Vec3 {
        Vec3::from_array(self.incline)
    }

    pub fn gradient_scale(&self) -> Vec3 {
        Vec3::from_array(self.gradient_scale)
    }

    pub fn gradient_noise_speed(&self) -> Vec3 {
        Vec3::from_array(self.gradient_noise_speed)
    }

    pub fn gradient_grain_scale(&self) -> Vec2 {
        Vec2::from_array(self.gradient_grain_scale)
    }

    pub fn gradient_grain_offset(&self) -> Vec2 {
        Vec2::from_array(self.gradient_grain_offset)
    }
}

/// Per-object transform block, one buffer per scene
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Inverse-transpose of model-view, upper 3x3 in a 4x4 for alignment
    pub normal_matrix: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        let model_view = view * model;
        let normal = Mat3::from_mat4(model_view).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
        }
    }
}

/// Vertex layout of the ribbon mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
}

impl RibbonVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex layout of the environment plane
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
}

impl PlaneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
