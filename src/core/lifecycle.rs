use log::{debug, info, warn};

use crate::camera::PerspectiveCamera;
use crate::config::BackdropConfig;
use crate::controls::OrbitControls;
use crate::scene::SceneSet;
use crate::traits::{
    FrameRequest, Host, ListenerId, RenderResult, RendererFactory, SceneRenderer, SurfaceHandle,
};
use crate::types::FrameParams;

use super::frame::FrameClock;
use super::ramp_texture::RampSource;
use super::render_target::ENV_TARGET_SIZE;
use super::resize::PendingResize;
use super::viewport::Viewport;

/// Where a backdrop is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Running,
    /// Terminal
    Disposed,
}

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("host is not interactive")]
    NotInteractive,
    #[error("graphics context unavailable: {0}")]
    Renderer(String),
    #[error("scene upload failed: {0}")]
    Upload(String),
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Rendered { frame: u64, time: f32 },
    /// Not running; nothing drawn or scheduled
    Skipped,
}

/// Every resource of one running backdrop, acquired and released as a unit
pub struct LifecycleHandle<R: SceneRenderer> {
    camera: PerspectiveCamera,
    controls: OrbitControls,
    renderer: R,
    params: FrameParams,
    clock: FrameClock,
    pending_frame: Option<FrameRequest>,
    resize: PendingResize,
    listener: ListenerId,
    surface: SurfaceHandle,
}

impl<R: SceneRenderer> LifecycleHandle<R> {
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn params(&self) -> &FrameParams {
        &self.params
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            debug!("Ignoring empty viewport {}x{}", viewport.width, viewport.height);
            return;
        }
        self.camera.set_aspect(viewport.aspect());
        self.renderer.resize(viewport);
    }

    /// Environment capture strictly before the main draw
    fn draw(&mut self) -> RenderResult<()> {
        self.renderer.begin_frame(&self.params)?;
        self.renderer.render_environment(&self.camera)?;
        self.controls.update(&mut self.camera);
        self.renderer.render_main(&self.camera)
    }
}

/// Animated ribbon background bound to one host.
///
/// `mount` brings it up, the host drives `tick` once per refresh, and
/// `unmount` (or drop) tears everything down.
pub struct Backdrop<H: Host, F: RendererFactory> {
    host: H,
    factory: F,
    config: BackdropConfig,
    state: LifecycleState,
    handle: Option<LifecycleHandle<F::Renderer>>,
}

impl<H: Host, F: RendererFactory> Backdrop<H, F> {
    pub fn new(host: H, factory: F, config: BackdropConfig) -> Self {
        Self {
            host,
            factory,
            config,
            state: LifecycleState::Uninitialized,
            handle: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn handle(&self) -> Option<&LifecycleHandle<F::Renderer>> {
        self.handle.as_ref()
    }

    /// Route pointer input to the view controls while running
    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.handle.as_mut().map(|h| &mut h.controls)
    }

    /// Build all resources and start the animation loop.
    ///
    /// On failure the backdrop stays `Uninitialized` and draws nothing.
    /// Mounting an already running or disposed backdrop does nothing.
    pub fn mount(&mut self) -> Result<(), MountError> {
        if self.state != LifecycleState::Uninitialized {
            debug!("Mount ignored in state {:?}", self.state);
            return Ok(());
        }
        if !self.host.is_interactive() {
            return Err(MountError::NotInteractive);
        }

        self.state = LifecycleState::Initializing;
        match self.initialize() {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = LifecycleState::Running;
                info!("Backdrop running");
                Ok(())
            }
            Err(e) => {
                warn!("Backdrop failed to start: {}", e);
                self.state = LifecycleState::Uninitialized;
                Err(e)
            }
        }
    }

    fn initialize(&mut self) -> Result<LifecycleHandle<F::Renderer>, MountError> {
        let viewport = self.host.viewport();
        let camera = PerspectiveCamera::new(viewport.aspect());

        let mut renderer = self
            .factory
            .create(viewport)
            .map_err(|e| MountError::Renderer(e.to_string()))?;

        renderer.load_ramp(RampSource::from_config(&self.config));
        renderer.create_environment_target(ENV_TARGET_SIZE);

        let params = FrameParams::new(&self.config.shader, self.config.incline);
        let scenes = SceneSet::build();
        if let Err(e) = renderer.upload_scenes(&params, &scenes) {
            renderer.dispose();
            return Err(MountError::Upload(e.to_string()));
        }

        let controls = OrbitControls::new();

        let surface = renderer.surface();
        self.host.attach_surface(surface);
        let resize = PendingResize::new();
        let listener = self.host.subscribe_resize(resize.clone());
        let pending_frame = Some(self.host.request_frame());

        Ok(LifecycleHandle {
            camera,
            controls,
            renderer,
            params,
            clock: FrameClock::new(),
            pending_frame,
            resize,
            listener,
            surface,
        })
    }

    /// One animation step for the refresh stamped `timestamp_ms`.
    ///
    /// Applies any pending resize, advances time, draws both passes and
    /// schedules exactly one follow-up frame.
    pub fn tick(&mut self, timestamp_ms: f64) -> TickOutcome {
        if self.state != LifecycleState::Running {
            return TickOutcome::Skipped;
        }
        let Some(handle) = self.handle.as_mut() else {
            return TickOutcome::Skipped;
        };

        // The request that brought us here; cancelling a fired one is a no-op
        if let Some(request) = handle.pending_frame.take() {
            self.host.cancel_frame(request);
        }

        if let Some(viewport) = handle.resize.take() {
            handle.apply_resize(viewport);
        }

        handle.clock = handle.clock.advance(timestamp_ms);
        handle.params = handle.params.with_time(handle.clock.time);

        if let Err(e) = handle.draw() {
            warn!("Frame {} failed: {}", handle.clock.number, e);
        }

        handle.pending_frame = Some(self.host.request_frame());

        TickOutcome::Rendered {
            frame: handle.clock.number,
            time: handle.clock.time,
        }
    }

    /// Record a new viewport; applied at the start of the next tick
    pub fn handle_resize(&mut self, viewport: Viewport) {
        if let Some(handle) = &self.handle {
            handle.resize.post(viewport);
        }
    }

    /// Cancel the loop and release everything; safe to call repeatedly
    pub fn unmount(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        self.state = LifecycleState::Disposed;

        if let Some(request) = handle.pending_frame.take() {
            self.host.cancel_frame(request);
        }
        self.host.unsubscribe_resize(handle.listener);
        handle.renderer.dispose();
        self.host.detach_surface(handle.surface);

        info!("Backdrop disposed after {} frames", handle.clock.number);
    }
}

impl<H: Host, F: RendererFactory> Drop for Backdrop<H, F> {
    fn drop(&mut self) {
        self.unmount();
    }
}
