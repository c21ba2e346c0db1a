use glam::Vec2;
use winit::event::{ElementState, TouchPhase, WindowEvent};

/// A pointer event the session reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// A mouse button or touch went down at a position in logical pixels.
    Down { position: Vec2 },
}

/// Tracks the pointer across mouse and touch input.
#[derive(Debug)]
pub struct Input {
    pointer_position: Vec2,
    scale_factor: f64,
    presses: u32,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            pointer_position: Vec2::ZERO,
            scale_factor: 1.0,
            presses: 0,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Used to convert physical event positions to logical pixels.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Process a window event. Returns a pointer-down event for any mouse
    /// button press or touch start.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_position = self.logical(position.x, position.y);
                None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => {
                self.presses += 1;
                Some(PointerEvent::Down {
                    position: self.pointer_position,
                })
            }
            WindowEvent::Touch(touch) => {
                self.pointer_position = self.logical(touch.location.x, touch.location.y);
                if touch.phase == TouchPhase::Started {
                    self.presses += 1;
                    Some(PointerEvent::Down {
                        position: self.pointer_position,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Last known pointer position in logical pixels.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Pointer presses seen so far.
    pub fn presses(&self) -> u32 {
        self.presses
    }

    fn logical(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new((x / self.scale_factor) as f32, (y / self.scale_factor) as f32)
    }
}
