#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ribbon_backdrop::camera::PerspectiveCamera;
use ribbon_backdrop::core::{PendingResize, RampSource, Viewport};
use ribbon_backdrop::scene::SceneSet;
use ribbon_backdrop::traits::{
    FrameRequest, FrameScheduler, ListenerId, MountTarget, RenderResult, RendererFactory,
    ResizeSource, SceneRenderer, SurfaceHandle,
};
use ribbon_backdrop::types::FrameParams;

/// Everything the host saw, shared so tests can inspect it after the
/// backdrop (and its host) is dropped
#[derive(Debug, Default)]
pub struct HostState {
    pub interactive: bool,
    pub viewport: Viewport,
    next_id: u64,
    pub outstanding: Vec<FrameRequest>,
    pub max_outstanding: usize,
    pub requested: usize,
    pub cancelled: usize,
    pub listeners: Vec<(ListenerId, PendingResize)>,
    pub attached: Option<SurfaceHandle>,
}

#[derive(Debug, Clone)]
pub struct MockHost {
    pub state: Rc<RefCell<HostState>>,
}

impl MockHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                interactive: true,
                viewport: Viewport::new(width, height),
                ..HostState::default()
            })),
        }
    }

    pub fn headless() -> Self {
        let host = Self::new(800, 600);
        host.state.borrow_mut().interactive = false;
        host
    }

    /// Deliver the oldest scheduled refresh callback
    pub fn fire(&self) -> Option<FrameRequest> {
        let mut state = self.state.borrow_mut();
        if state.outstanding.is_empty() {
            None
        } else {
            Some(state.outstanding.remove(0))
        }
    }

    pub fn fire_resize(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.viewport = Viewport::new(width, height);
        for (_, sink) in &state.listeners {
            sink.post(Viewport::new(width, height));
        }
    }

    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    pub fn max_outstanding(&self) -> usize {
        self.state.borrow().max_outstanding
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn attached(&self) -> Option<SurfaceHandle> {
        self.state.borrow().attached
    }
}

impl FrameScheduler for MockHost {
    fn request_frame(&mut self) -> FrameRequest {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let request = FrameRequest(state.next_id);
        state.outstanding.push(request);
        state.requested += 1;
        state.max_outstanding = state.max_outstanding.max(state.outstanding.len());
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut state = self.state.borrow_mut();
        state.cancelled += 1;
        state.outstanding.retain(|r| *r != request);
    }
}

impl ResizeSource for MockHost {
    fn subscribe_resize(&mut self, sink: PendingResize) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.push((id, sink));
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|(listener, _)| *listener != id);
    }
}

impl MountTarget for MockHost {
    fn is_interactive(&self) -> bool {
        self.state.borrow().interactive
    }

    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn attach_surface(&mut self, surface: SurfaceHandle) {
        self.state.borrow_mut().attached = Some(surface);
    }

    fn detach_surface(&mut self, surface: SurfaceHandle) {
        let mut state = self.state.borrow_mut();
        if state.attached == Some(surface) {
            state.attached = None;
        }
    }
}

/// One renderer call as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadRamp(RampSource),
    CreateEnvironmentTarget(u32),
    UploadScenes { vertices: usize, incline: f32 },
    Resize(Viewport),
    BeginFrame { time: f32 },
    RenderEnvironment { aspect: f32, position: [f32; 3] },
    RenderMain { aspect: f32, position: [f32; 3] },
    Dispose,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct MockRenderer {
    log: CallLog,
    surface: SurfaceHandle,
    fail_upload: bool,
    disposed: bool,
}

impl SceneRenderer for MockRenderer {
    fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    fn load_ramp(&mut self, source: RampSource) {
        self.log.borrow_mut().push(Call::LoadRamp(source));
    }

    fn create_environment_target(&mut self, size: u32) {
        self.log.borrow_mut().push(Call::CreateEnvironmentTarget(size));
    }

    fn upload_scenes(&mut self, params: &FrameParams, scenes: &SceneSet) -> RenderResult<()> {
        if self.fail_upload {
            return Err("out of memory".into());
        }
        self.log.borrow_mut().push(Call::UploadScenes {
            vertices: scenes.ribbon.vertex_count(),
            incline: params.incline[0],
        });
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().push(Call::Resize(viewport));
    }

    fn begin_frame(&mut self, params: &FrameParams) -> RenderResult<()> {
        self.log.borrow_mut().push(Call::BeginFrame { time: params.time });
        Ok(())
    }

    fn render_environment(&mut self, camera: &PerspectiveCamera) -> RenderResult<()> {
        self.log.borrow_mut().push(Call::RenderEnvironment {
            aspect: camera.aspect,
            position: camera.position.to_array(),
        });
        Ok(())
    }

    fn render_main(&mut self, camera: &PerspectiveCamera) -> RenderResult<()> {
        self.log.borrow_mut().push(Call::RenderMain {
            aspect: camera.aspect,
            position: camera.position.to_array(),
        });
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.log.borrow_mut().push(Call::Dispose);
        }
    }
}

#[derive(Default)]
pub struct MockFactory {
    pub log: CallLog,
    pub created: Rc<Cell<usize>>,
    pub fail_create: bool,
    pub fail_upload: bool,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn handles(&self) -> (CallLog, Rc<Cell<usize>>) {
        (self.log.clone(), self.created.clone())
    }
}

impl RendererFactory for MockFactory {
    type Renderer = MockRenderer;

    fn create(&mut self, _viewport: Viewport) -> RenderResult<MockRenderer> {
        if self.fail_create {
            return Err("webgl unsupported".into());
        }
        self.created.set(self.created.get() + 1);
        Ok(MockRenderer {
            log: self.log.clone(),
            surface: SurfaceHandle(7),
            fail_upload: self.fail_upload,
            disposed: false,
        })
    }
}

/// Frame-loop calls only, without the one-time setup calls
pub fn frame_calls(log: &CallLog) -> Vec<Call> {
    log.borrow()
        .iter()
        .filter(|c| {
            matches!(
                c,
                Call::BeginFrame { .. } | Call::RenderEnvironment { .. } | Call::RenderMain { .. }
            )
        })
        .cloned()
        .collect()
}
