use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::controls::OrbitControls;

/// Pixels of trackpad scroll treated as one wheel notch
const PIXELS_PER_STEP: f32 = 50.0;

/// Collects winit pointer events between ticks and hands them to the orbit
/// controls as drag deltas and wheel steps.
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    dragging: bool,
    cursor: Option<(f32, f32)>,
    drag_delta: (f32, f32),
    wheel_steps: f32,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_dragging(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_STEP,
                };
                // Scrolling up pulls the camera in
                self.scroll(-steps);
            }
            _ => {}
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        if let (Some((ox, oy)), true) = (self.cursor, self.dragging) {
            self.drag_delta.0 += x - ox;
            self.drag_delta.1 += y - oy;
        }
        self.cursor = Some((x, y));
    }

    /// Positive steps move away from the target
    pub fn scroll(&mut self, steps: f32) {
        self.wheel_steps += steps;
    }

    pub fn drag_delta(&self) -> (f32, f32) {
        self.drag_delta
    }

    /// Feed everything gathered since the last call into `controls`
    pub fn apply(&mut self, controls: &mut OrbitControls, viewport_height: f32) {
        let (dx, dy) = std::mem::take(&mut self.drag_delta);
        if dx != 0.0 || dy != 0.0 {
            controls.drag(dx, dy, viewport_height);
        }
        let steps = std::mem::take(&mut self.wheel_steps);
        if steps != 0.0 {
            controls.wheel(steps);
        }
    }
}
