//! Window events to scene commands.
//!
//! [`Input`] turns raw winit events into a small set of [`Command`]s. Mouse
//! and touch feed the same drag path: only one pointer drags at a time, and
//! only the delta between consecutive positions of that pointer is reported.
//!
//! | Input | Command |
//! |-------|---------|
//! | Space | toggle formation |
//! | T | cycle theme |
//! | S | snow |
//! | F | fireworks |
//! | Escape | quit |
//! | left mouse / one finger drag | rotate |
//! | wheel | zoom |

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::scene::Action;

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

/// What the viewer should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Action(Action),
    DragStart,
    /// Drag by this many screen pixels.
    Drag(Vec2),
    DragEnd,
    /// Wheel lines, positive is toward the screen.
    Zoom(f32),
    Quit,
}

/// Which device holds the drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Mouse,
    Touch(u64),
}

/// Key bindings.
pub fn binding(key: KeyCode) -> Option<Command> {
    let command = match key {
        KeyCode::Space => Command::Action(Action::ToggleFormation),
        KeyCode::KeyT => Command::Action(Action::CycleTheme),
        KeyCode::KeyS => Command::Action(Action::ToggleSnow),
        KeyCode::KeyF => Command::Action(Action::LaunchFireworks),
        KeyCode::Escape => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Pointer tracking between events.
#[derive(Debug, Default)]
pub struct Input {
    /// Pointer currently dragging, if any.
    active: Option<Pointer>,
    /// Last known position of the active pointer.
    last_position: Option<Vec2>,
    /// Last cursor position, tracked even while not dragging.
    cursor: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    #[inline]
    pub fn active_pointer(&self) -> Option<Pointer> {
        self.active
    }

    pub fn pointer_down(&mut self, pointer: Pointer, position: Vec2) -> Option<Command> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(pointer);
        self.last_position = Some(position);
        Some(Command::DragStart)
    }

    pub fn pointer_moved(&mut self, pointer: Pointer, position: Vec2) -> Option<Command> {
        if self.active != Some(pointer) {
            return None;
        }
        let delta = self.last_position.map(|last| position - last);
        self.last_position = Some(position);
        delta.filter(|d| *d != Vec2::ZERO).map(Command::Drag)
    }

    pub fn pointer_up(&mut self, pointer: Pointer) -> Option<Command> {
        if self.active != Some(pointer) {
            return None;
        }
        self.active = None;
        self.last_position = None;
        Some(Command::DragEnd)
    }

    /// Focus loss or similar: end any drag without a release event.
    pub fn cancel(&mut self) -> Option<Command> {
        let pointer = self.active?;
        self.pointer_up(pointer)
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Command> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => binding(code),
                    PhysicalKey::Unidentified(_) => None,
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.pointer_down(Pointer::Mouse, self.cursor),
                ElementState::Released => self.pointer_up(Pointer::Mouse),
            },

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.pointer_moved(Pointer::Mouse, self.cursor)
            }

            WindowEvent::CursorLeft { .. } => self.pointer_up(Pointer::Mouse),

            WindowEvent::Touch(touch) => {
                let pointer = Pointer::Touch(touch.id);
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => self.pointer_down(pointer, position),
                    TouchPhase::Moved => self.pointer_moved(pointer, position),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.pointer_up(pointer),
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                (lines != 0.0).then_some(Command::Zoom(lines))
            }

            WindowEvent::Focused(false) => self.cancel(),

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(binding(KeyCode::Space), Some(Command::Action(Action::ToggleFormation)));
        assert_eq!(binding(KeyCode::KeyT), Some(Command::Action(Action::CycleTheme)));
        assert_eq!(binding(KeyCode::KeyS), Some(Command::Action(Action::ToggleSnow)));
        assert_eq!(binding(KeyCode::KeyF), Some(Command::Action(Action::LaunchFireworks)));
        assert_eq!(binding(KeyCode::Escape), Some(Command::Quit));
        assert_eq!(binding(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_mouse_drag_reports_deltas() {
        let mut input = Input::new();
        assert_eq!(input.pointer_moved(Pointer::Mouse, Vec2::new(5.0, 5.0)), None);

        assert_eq!(input.pointer_down(Pointer::Mouse, Vec2::new(10.0, 10.0)), Some(Command::DragStart));
        assert_eq!(
            input.pointer_moved(Pointer::Mouse, Vec2::new(14.0, 7.0)),
            Some(Command::Drag(Vec2::new(4.0, -3.0)))
        );
        assert_eq!(
            input.pointer_moved(Pointer::Mouse, Vec2::new(20.0, 7.0)),
            Some(Command::Drag(Vec2::new(6.0, 0.0)))
        );
        assert_eq!(input.pointer_up(Pointer::Mouse), Some(Command::DragEnd));
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_single_touch_only() {
        let mut input = Input::new();
        input.pointer_down(Pointer::Touch(1), Vec2::ZERO);

        // A second finger neither starts nor moves nor ends the drag.
        assert_eq!(input.pointer_down(Pointer::Touch(2), Vec2::ONE), None);
        assert_eq!(input.pointer_moved(Pointer::Touch(2), Vec2::new(50.0, 50.0)), None);
        assert_eq!(input.pointer_up(Pointer::Touch(2)), None);
        assert_eq!(input.active_pointer(), Some(Pointer::Touch(1)));

        assert_eq!(
            input.pointer_moved(Pointer::Touch(1), Vec2::new(0.0, 8.0)),
            Some(Command::Drag(Vec2::new(0.0, 8.0)))
        );
        assert_eq!(input.pointer_up(Pointer::Touch(1)), Some(Command::DragEnd));
    }

    #[test]
    fn test_mouse_ignored_during_touch_drag() {
        let mut input = Input::new();
        input.pointer_down(Pointer::Touch(3), Vec2::ZERO);
        assert_eq!(input.pointer_down(Pointer::Mouse, Vec2::ZERO), None);
        assert_eq!(input.pointer_moved(Pointer::Mouse, Vec2::ONE), None);
    }

    #[test]
    fn test_cancel_ends_drag() {
        let mut input = Input::new();
        assert_eq!(input.cancel(), None);
        input.pointer_down(Pointer::Mouse, Vec2::ZERO);
        assert_eq!(input.cancel(), Some(Command::DragEnd));
        assert!(!input.is_dragging());
    }
}
