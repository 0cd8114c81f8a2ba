use wgpu::{Device, Sampler, Texture, TextureFormat, TextureView};

/// Side of the square environment target, in texels
pub const ENV_TARGET_SIZE: u32 = 1000;

pub const ENV_TARGET_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

/// Offscreen color target the environment pass paints and the ribbon samples
pub struct EnvironmentTarget {
    texture: Texture,
    view: TextureView,
    sampler: Sampler,
}

impl EnvironmentTarget {
    pub fn new(device: &Device, size: u32) -> Self {
        let size = size.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ENV_TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = clamp_sampler(device, "Environment Target Sampler");

        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Linear filtering, clamp to edge on every axis
pub fn clamp_sampler(device: &Device, label: &str) -> Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
