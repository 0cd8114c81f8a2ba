use crate::camera::PerspectiveCamera;
use crate::core::{RampSource, Viewport};
use crate::scene::SceneSet;
use crate::types::FrameParams;

use super::host::SurfaceHandle;

pub type RenderResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Two-pass scene renderer: environment capture, then the reflective ribbon.
///
/// Setup calls arrive once in declaration order; the three frame calls
/// arrive once per tick in the order `begin_frame`, `render_environment`,
/// `render_main`.
pub trait SceneRenderer {
    fn surface(&self) -> SurfaceHandle;

    /// Start loading the color ramp; must not block or fail
    fn load_ramp(&mut self, source: RampSource);

    /// Allocate the square offscreen target the environment pass draws into
    fn create_environment_target(&mut self, size: u32);

    /// Upload geometry and build both materials around one shared params block
    fn upload_scenes(&mut self, params: &FrameParams, scenes: &SceneSet) -> RenderResult<()>;

    fn resize(&mut self, viewport: Viewport);

    /// Publish this frame's params and pick up any finished asset loads
    fn begin_frame(&mut self, params: &FrameParams) -> RenderResult<()>;

    fn render_environment(&mut self, camera: &PerspectiveCamera) -> RenderResult<()>;

    fn render_main(&mut self, camera: &PerspectiveCamera) -> RenderResult<()>;

    /// Release GPU resources; later calls become no-ops
    fn dispose(&mut self);
}

/// Creates the renderer once the host is ready
pub trait RendererFactory {
    type Renderer: SceneRenderer;

    fn create(&mut self, viewport: Viewport) -> RenderResult<Self::Renderer>;
}
