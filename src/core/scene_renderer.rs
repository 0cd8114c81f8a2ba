use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Mat4;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, SurfaceConfiguration,
    TextureFormat, TextureView,
};
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::scene::SceneSet;
use crate::traits::{RenderResult, RendererFactory, SceneRenderer, SurfaceHandle};
use crate::types::{FrameParams, ObjectUniform, PlaneVertex, RibbonVertex};

use super::gpu_context::GpuContext;
use super::ramp_texture::{RampImage, RampLoader, RampPoll, RampSource};
use super::render_target::{clamp_sampler, EnvironmentTarget, ENV_TARGET_FORMAT};
use super::viewport::Viewport;

pub const MSAA_SAMPLES: u32 = 4;
const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const ENVIRONMENT_SHADER: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/simplex3.wgsl"),
    include_str!("../shaders/environment.wgsl"),
);

const RIBBON_SHADER: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/psrdnoise.wgsl"),
    include_str!("../shaders/ribbon.wgsl"),
);

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

/// Indexed geometry resident on the GPU
struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &Device, label: &str, vertices: &[u8], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// One drawable: pipeline, mesh, transform and both bind groups
struct ScenePass {
    pipeline: RenderPipeline,
    mesh: GpuMesh,
    model: Mat4,
    object_buffer: Buffer,
    globals: BindGroup,
    source: BindGroup,
}

impl ScenePass {
    fn write_transform(&self, queue: &wgpu::Queue, camera: &PerspectiveCamera) {
        let uniform = ObjectUniform::new(self.model, camera.view_matrix(), camera.projection_matrix());
        queue.write_buffer(&self.object_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals, &[]);
        pass.set_bind_group(1, &self.source, &[]);
        self.mesh.draw(pass);
    }
}

/// Sampled color ramp, replaced once the loader delivers
struct RampTexture {
    view: TextureView,
    sampler: wgpu::Sampler,
}

impl RampTexture {
    fn upload(gpu: &GpuContext, image: &RampImage) -> Self {
        let texture = gpu.device().create_texture_with_data(
            gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some("Ramp Texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: clamp_sampler(gpu.device(), "Ramp Sampler"),
        }
    }
}

/// Framebuffer attachments sized to the surface
struct Attachments {
    msaa: TextureView,
    depth: TextureView,
}

impl Attachments {
    fn new(device: &Device, config: &SurfaceConfiguration) -> Self {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };
        let msaa = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Main Pass MSAA Color"),
            size,
            mip_level_count: 1,
            sample_count: MSAA_SAMPLES,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Main Pass Depth"),
            size,
            mip_level_count: 1,
            sample_count: MSAA_SAMPLES,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            msaa: msaa.create_view(&wgpu::TextureViewDescriptor::default()),
            depth: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }
}

/// Everything that lives on the GPU; dropped as a whole on dispose
struct GpuResources {
    gpu: GpuContext,
    surface_config: SurfaceConfiguration,
    attachments: Attachments,
    globals_layout: BindGroupLayout,
    source_layout: BindGroupLayout,
    ramp_loader: RampLoader,
    ramp: RampTexture,
    env_target: Option<EnvironmentTarget>,
    params_buffer: Option<Buffer>,
    environment: Option<ScenePass>,
    ribbon: Option<ScenePass>,
}

/// Pick an sRGB format and a compositing alpha mode from what the surface offers
fn surface_modes(
    caps: &wgpu::SurfaceCapabilities,
) -> RenderResult<(TextureFormat, wgpu::CompositeAlphaMode)> {
    let format = caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or("surface reports no supported formats")?;
    // Let the page behind show through where the clear color is transparent
    let alpha_mode = [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|mode| caps.alpha_modes.contains(mode))
    .or_else(|| caps.alpha_modes.first().copied())
    .ok_or("surface reports no alpha modes")?;
    Ok((format, alpha_mode))
}

/// wgpu implementation of the two-pass backdrop renderer
pub struct GpuSceneRenderer {
    id: SurfaceHandle,
    resources: Option<GpuResources>,
}

impl GpuSceneRenderer {
    pub fn new(gpu: GpuContext, viewport: Viewport) -> RenderResult<Self> {
        let (format, alpha_mode) = surface_modes(&gpu.surface_capabilities())?;

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        gpu.surface().configure(gpu.device(), &surface_config);
        debug!("Surface configured as {:?} with {:?}", format, alpha_mode);

        let attachments = Attachments::new(gpu.device(), &surface_config);
        let globals_layout = Self::create_globals_layout(gpu.device());
        let source_layout = Self::create_source_layout(gpu.device());
        let ramp = RampTexture::upload(&gpu, &RampImage::placeholder());

        Ok(Self {
            id: SurfaceHandle(NEXT_SURFACE.fetch_add(1, Ordering::Relaxed)),
            resources: Some(GpuResources {
                gpu,
                surface_config,
                attachments,
                globals_layout,
                source_layout,
                ramp_loader: RampLoader::default(),
                ramp,
                env_target: None,
                params_buffer: None,
                environment: None,
                ribbon: None,
            }),
        })
    }

    fn create_globals_layout(device: &Device) -> BindGroupLayout {
        let uniform = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[
                uniform(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform(1, wgpu::ShaderStages::VERTEX),
            ],
        })
    }

    fn create_source_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Source Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }
}

impl GpuResources {
    fn device(&self) -> &Device {
        self.gpu.device()
    }

    fn source_bind_group(&self, label: &str, view: &TextureView, sampler: &wgpu::Sampler) -> BindGroup {
        self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.source_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn globals_bind_group(&self, label: &str, params: &Buffer, object: &Buffer) -> BindGroup {
        self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: object.as_entire_binding(),
                },
            ],
        })
    }

    fn object_buffer(&self, label: &str) -> Buffer {
        self.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_pipeline(
        &self,
        label: &str,
        source: &str,
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        target: TextureFormat,
        main_pass: bool,
    ) -> RenderPipeline {
        let device = self.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&self.globals_layout, &self.source_layout],
            push_constant_ranges: &[],
        });

        let (cull_mode, depth_stencil, count) = if main_pass {
            (
                Some(wgpu::Face::Back),
                Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                MSAA_SAMPLES,
            )
        } else {
            // Environment plane is double sided
            (None, None, 1)
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                ..Default::default()
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    /// Swap in a delivered ramp and rebind the environment material
    fn poll_ramp(&mut self) {
        match self.ramp_loader.poll() {
            RampPoll::Idle | RampPoll::Pending => {}
            RampPoll::Ready(image) => {
                let max = self.device().limits().max_texture_dimension_2d;
                if !image.fits_within(max) {
                    warn!(
                        "Ramp texture {}x{} exceeds the device limit of {}, keeping placeholder",
                        image.width, image.height, max
                    );
                    return;
                }
                info!("Ramp texture ready ({}x{})", image.width, image.height);
                self.ramp = RampTexture::upload(&self.gpu, &image);
                let source = self.source_bind_group("Ramp Bind Group", &self.ramp.view, &self.ramp.sampler);
                if let Some(env) = self.environment.as_mut() {
                    env.source = source;
                }
            }
            RampPoll::Failed(e) => warn!("Ramp texture failed to load: {}", e),
        }
    }

    fn main_target_format(&self) -> TextureFormat {
        self.surface_config.format
    }
}

impl SceneRenderer for GpuSceneRenderer {
    fn surface(&self) -> SurfaceHandle {
        self.id
    }

    fn load_ramp(&mut self, source: RampSource) {
        if let Some(res) = self.resources.as_mut() {
            res.ramp_loader = RampLoader::spawn(source);
        }
    }

    fn create_environment_target(&mut self, size: u32) {
        if let Some(res) = self.resources.as_mut() {
            res.env_target = Some(EnvironmentTarget::new(res.gpu.device(), size));
        }
    }

    fn upload_scenes(&mut self, params: &FrameParams, scenes: &SceneSet) -> RenderResult<()> {
        let res = self.resources.as_mut().ok_or("renderer disposed")?;
        let env_target = res
            .env_target
            .as_ref()
            .ok_or("environment target must exist before scenes are uploaded")?;

        let params_buffer = res.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Params"),
            contents: bytemuck::cast_slice(&[*params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let environment = {
            let mesh = GpuMesh::new(
                res.device(),
                "Environment",
                bytemuck::cast_slice(&scenes.environment.mesh.plane_vertices()),
                &scenes.environment.mesh.indices,
            );
            let object_buffer = res.object_buffer("Environment Transform");
            ScenePass {
                pipeline: res.create_pipeline(
                    "Environment Pipeline",
                    ENVIRONMENT_SHADER,
                    PlaneVertex::layout(),
                    ENV_TARGET_FORMAT,
                    false,
                ),
                mesh,
                model: scenes.environment.model_matrix(),
                globals: res.globals_bind_group("Environment Globals", &params_buffer, &object_buffer),
                source: res.source_bind_group("Ramp Bind Group", &res.ramp.view, &res.ramp.sampler),
                object_buffer,
            }
        };

        let ribbon = {
            let mesh = GpuMesh::new(
                res.device(),
                "Ribbon",
                bytemuck::cast_slice(&scenes.ribbon.ribbon_vertices()),
                &scenes.ribbon.indices,
            );
            let object_buffer = res.object_buffer("Ribbon Transform");
            ScenePass {
                pipeline: res.create_pipeline(
                    "Ribbon Pipeline",
                    RIBBON_SHADER,
                    RibbonVertex::layout(),
                    res.main_target_format(),
                    true,
                ),
                mesh,
                model: scenes.ribbon_model_matrix(),
                globals: res.globals_bind_group("Ribbon Globals", &params_buffer, &object_buffer),
                source: res.source_bind_group(
                    "Environment Bind Group",
                    env_target.view(),
                    env_target.sampler(),
                ),
                object_buffer,
            }
        };

        info!(
            "Uploaded ribbon with {} vertices and {} triangles",
            scenes.ribbon.vertex_count(),
            scenes.ribbon.indices.len() / 3
        );

        res.params_buffer = Some(params_buffer);
        res.environment = Some(environment);
        res.ribbon = Some(ribbon);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        let Some(res) = self.resources.as_mut() else {
            return;
        };
        if viewport.is_empty() {
            return;
        }

        res.surface_config.width = viewport.width;
        res.surface_config.height = viewport.height;
        res.gpu.surface().configure(res.gpu.device(), &res.surface_config);
        res.attachments = Attachments::new(res.gpu.device(), &res.surface_config);
        debug!("Resized surface to {}x{}", viewport.width, viewport.height);
    }

    fn begin_frame(&mut self, params: &FrameParams) -> RenderResult<()> {
        let Some(res) = self.resources.as_mut() else {
            return Ok(());
        };
        res.poll_ramp();

        let buffer = res.params_buffer.as_ref().ok_or("scenes not uploaded")?;
        res.gpu.queue().write_buffer(buffer, 0, bytemuck::cast_slice(&[*params]));
        Ok(())
    }

    fn render_environment(&mut self, camera: &PerspectiveCamera) -> RenderResult<()> {
        let Some(res) = self.resources.as_ref() else {
            return Ok(());
        };
        let (Some(env), Some(target)) = (&res.environment, &res.env_target) else {
            return Err("scenes not uploaded".into());
        };

        env.write_transform(res.gpu.queue(), camera);

        let mut encoder = res
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Environment Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Environment Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            env.draw(&mut pass);
        }
        res.gpu.queue().submit(Some(encoder.finish()));
        Ok(())
    }

    fn render_main(&mut self, camera: &PerspectiveCamera) -> RenderResult<()> {
        let Some(res) = self.resources.as_ref() else {
            return Ok(());
        };
        let ribbon = res.ribbon.as_ref().ok_or("scenes not uploaded")?;

        let frame = match res.gpu.surface().get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                debug!("Surface lost, reconfiguring");
                res.gpu.surface().configure(res.gpu.device(), &res.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        ribbon.write_transform(res.gpu.queue(), camera);

        let mut encoder = res
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &res.attachments.msaa,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Discard,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &res.attachments.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            ribbon.draw(&mut pass);
        }
        res.gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(res) = self.resources.take() {
            if let Some(target) = &res.env_target {
                target.destroy();
            }
            debug!("Renderer resources released");
        }
    }
}

/// Builds a `GpuSceneRenderer` on the window once the event loop is live
pub struct GpuRendererFactory {
    window: Arc<Window>,
}

impl GpuRendererFactory {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl RendererFactory for GpuRendererFactory {
    type Renderer = GpuSceneRenderer;

    fn create(&mut self, viewport: Viewport) -> RenderResult<GpuSceneRenderer> {
        let gpu = pollster::block_on(GpuContext::new_for_window(self.window.clone()))?;
        GpuSceneRenderer::new(gpu, viewport)
    }
}
