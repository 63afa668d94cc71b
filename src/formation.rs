//! Formation toggle and pinch strength.
//!
//! The tree is either *formed* or *scattered*. Toggling starts a 1.5 s tween
//! of the pinch strength toward 1 (ease-out) or 0 (ease-in). The tween always
//! starts from the current value, so toggling mid-transition reverses
//! smoothly instead of jumping.
//!
//! ```text
//!             toggle                    1.5 s
//! Scattered ─────────▶ Converging ─────────────▶ Formed
//!     ▲                    │ toggle                 │ toggle
//!     │       1.5 s        ▼                        ▼
//!     └──────────────── Exploding ◀─────────────────┘
//! ```

/// Length of a formation tween in seconds.
pub const TRANSITION_SECONDS: f32 = 1.5;

/// Where the formation state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// At rest in the exploded cloud.
    Scattered,
    /// Tweening toward the tree.
    Converging,
    /// At rest as a tree.
    Formed,
    /// Tweening back toward the cloud.
    Exploding,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Scattered => "Scattered",
            Phase::Converging => "Converging",
            Phase::Formed => "Formed",
            Phase::Exploding => "Exploding",
        }
    }
}

/// Quadratic ease-out.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Toggle axis of the input state machine.
#[derive(Debug, Clone)]
pub struct Formation {
    formed: bool,
    phase: Phase,
    pinch: f32,
    /// Pinch value when the running tween started.
    from: f32,
    /// Tween progress in `[0, 1]`.
    progress: f32,
}

impl Formation {
    /// Start scattered with zero pinch.
    pub fn new() -> Self {
        Self {
            formed: false,
            phase: Phase::Scattered,
            pinch: 0.0,
            from: 0.0,
            progress: 1.0,
        }
    }

    /// Flip the formed flag and start a tween toward the new end value.
    ///
    /// Returns the new formed state.
    pub fn toggle(&mut self) -> bool {
        self.formed = !self.formed;
        self.from = self.pinch;
        self.progress = 0.0;
        self.phase = if self.formed {
            Phase::Converging
        } else {
            Phase::Exploding
        };
        self.formed
    }

    /// Advance the running tween by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.progress >= 1.0 {
            return;
        }

        self.progress = (self.progress + dt / TRANSITION_SECONDS).min(1.0);
        let (target, eased) = if self.formed {
            (1.0, ease_out(self.progress))
        } else {
            (0.0, ease_in(self.progress))
        };
        self.pinch = self.from + (target - self.from) * eased;

        if self.progress >= 1.0 {
            self.pinch = target;
            self.phase = if self.formed {
                Phase::Formed
            } else {
                Phase::Scattered
            };
        }
    }

    /// Whether the last toggle asked for the tree.
    #[inline]
    pub fn is_formed(&self) -> bool {
        self.formed
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current pinch strength in `[0, 1]`.
    #[inline]
    pub fn pinch_strength(&self) -> f32 {
        self.pinch
    }

    /// Progress of the running tween, 1.0 when idle.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether a tween is running.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.progress < 1.0
    }
}

impl Default for Formation {
    fn default() -> Self {
        Self::new()
    }
}
