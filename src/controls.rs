//! Drag-to-rotate for the tree group.
//!
//! While a pointer is held, each movement delta (in screen pixels) is scaled
//! by [`DRAG_SENSITIVITY`] and added straight onto the rotation target. When
//! idle and formed the group spins slowly around y. The live rotation is
//! assigned from the target every tick, with no smoothing.

use glam::{Quat, Vec2};

/// Radians per pixel of drag.
pub const DRAG_SENSITIVITY: f32 = 0.01;
/// Auto-rotation around y per tick while idle and formed (radians).
pub const AUTO_ROTATE_STEP: f32 = 0.002;

/// Current and target rotation of the tree group.
///
/// `x` is the pitch angle (rotation about the x axis), `y` the yaw.
#[derive(Debug, Clone, Default)]
pub struct Rotation {
    current: Vec2,
    target: Vec2,
    dragging: bool,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer went down.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Pointer moved by `delta` pixels. Ignored unless dragging.
    pub fn drag(&mut self, delta: Vec2) {
        if !self.dragging {
            return;
        }
        // Horizontal motion spins around y, vertical motion tilts around x.
        self.target.y += delta.x * DRAG_SENSITIVITY;
        self.target.x += delta.y * DRAG_SENSITIVITY;
    }

    /// The pointer was released.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// One simulation tick.
    pub fn tick(&mut self, formed: bool) {
        if formed && !self.dragging {
            self.target.y += AUTO_ROTATE_STEP;
        }
        self.current = self.target;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[inline]
    pub fn current(&self) -> Vec2 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Orientation of the group: yaw first, then pitch.
    pub fn quat(&self) -> Quat {
        Quat::from_rotation_x(self.current.x) * Quat::from_rotation_y(self.current.y)
    }
}
