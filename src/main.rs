use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use ribbon_backdrop::cli::Cli;
use ribbon_backdrop::config::BackdropConfig;
use ribbon_backdrop::core::{
    Backdrop, Clock, GpuRendererFactory, PendingResize, PointerInput, TickOutcome, Viewport,
};
use ribbon_backdrop::traits::{
    FrameRequest, FrameScheduler, ListenerId, MountTarget, ResizeSource, SurfaceHandle,
};

/// Host backed by one winit window; a frame request maps to `request_redraw`
struct WinitHost {
    window: Arc<Window>,
    next_id: u64,
    outstanding: Option<FrameRequest>,
    listeners: Vec<(ListenerId, PendingResize)>,
    surface: Option<SurfaceHandle>,
}

impl WinitHost {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            outstanding: None,
            listeners: Vec::new(),
            surface: None,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Consume the scheduled frame, if this redraw is one
    fn take_frame(&mut self) -> bool {
        self.outstanding.take().is_some()
    }

    fn post_resize(&self, viewport: Viewport) {
        for (_, sink) in &self.listeners {
            sink.post(viewport);
        }
    }
}

impl FrameScheduler for WinitHost {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id());
        self.outstanding = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.outstanding == Some(request) {
            self.outstanding = None;
        }
    }
}

impl ResizeSource for WinitHost {
    fn subscribe_resize(&mut self, sink: PendingResize) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.push((id, sink));
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }
}

impl MountTarget for WinitHost {
    fn is_interactive(&self) -> bool {
        true
    }

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    fn attach_surface(&mut self, surface: SurfaceHandle) {
        self.surface = Some(surface);
    }

    fn detach_surface(&mut self, surface: SurfaceHandle) {
        if self.surface == Some(surface) {
            self.surface = None;
        }
    }
}

struct App {
    cli: Cli,
    config: BackdropConfig,
    backdrop: Option<Backdrop<WinitHost, GpuRendererFactory>>,
    input: PointerInput,
    clock: Clock,
}

impl App {
    fn new(cli: Cli, config: BackdropConfig) -> Self {
        Self {
            cli,
            config,
            backdrop: None,
            input: PointerInput::new(),
            clock: Clock::new(),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.unmount();
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(backdrop) = self.backdrop.as_mut() else {
            return;
        };
        if !backdrop.host_mut().take_frame() {
            return;
        }

        let height = backdrop.host().viewport().height as f32;
        if let Some(controls) = backdrop.controls_mut() {
            self.input.apply(controls, height);
        }

        if let TickOutcome::Rendered { frame, .. } = backdrop.tick(self.clock.now_ms()) {
            if self.cli.frames.is_some_and(|limit| frame >= limit) {
                info!("Rendered {} frames, exiting", frame);
                self.shutdown(event_loop);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.backdrop.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Ribbon Backdrop")
                .with_transparent(true)
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let host = WinitHost::new(window.clone());
        let factory = GpuRendererFactory::new(window);
        let mut backdrop = Backdrop::new(host, factory, self.config.clone());
        if let Err(e) = backdrop.mount() {
            // The window stays up, just without a backdrop
            error!("Backdrop unavailable: {}", e);
        }
        self.clock.reset();
        self.backdrop = Some(backdrop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(backdrop) = &self.backdrop {
                    backdrop
                        .host()
                        .post_resize(Viewport::new(size.width, size.height));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.input.process_event(&other),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.backdrop_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, config);

    info!("Ribbon backdrop - drag to orbit, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
