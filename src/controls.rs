//! Mouse drag rotation.
//!
//! Dragging with any mouse button rotates the model around X and Y. The wheel
//! is swallowed so that page scrolling doesn't fight the canvas, and Space
//! pauses or resumes the idle spin.

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Clone, Debug, PartialEq)]
pub struct DragRotation {
    sensitivity: f32,
    dragging: bool,
    last: (f64, f64),
    rotation_x: f32,
    rotation_y: f32,
    animation_running: bool,
}

impl Default for DragRotation {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl DragRotation {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            dragging: false,
            last: (0.0, 0.0),
            rotation_x: 0.0,
            rotation_y: 0.0,
            animation_running: true,
        }
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last = (x, y);
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    pub fn motion(&mut self, x: f64, y: f64) {
        if self.dragging {
            let dx = (x - self.last.0) as f32;
            let dy = (y - self.last.1) as f32;
            self.rotation_y += dx * self.sensitivity;
            self.rotation_x += dy * self.sensitivity;
        }
        self.last = (x, y);
    }

    /// Wheel input is accepted and ignored; the camera distance is fixed.
    pub fn scroll(&mut self) -> bool {
        true
    }

    pub fn pause(&mut self) {
        self.animation_running = false;
    }

    pub fn resume(&mut self) {
        self.animation_running = true;
    }

    pub fn toggle_animation(&mut self) {
        self.animation_running = !self.animation_running;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn animation_running(&self) -> bool {
        self.animation_running
    }

    /// Feed a window event. Returns true when the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            // any button drags
            WindowEvent::MouseInput { state, .. } => {
                match state {
                    ElementState::Pressed => {
                        let (x, y) = self.last;
                        self.press(x, y);
                    }
                    ElementState::Released => self.release(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.motion(position.x, position.y);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.release();
                false
            }
            WindowEvent::MouseWheel { .. } => self.scroll(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.toggle_animation();
                log::info!(
                    "Spin {}",
                    if self.animation_running { "resumed" } else { "paused" }
                );
                true
            }
            _ => false,
        }
    }
}
