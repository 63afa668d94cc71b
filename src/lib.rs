//! # Tinsel - particle Christmas tree
//!
//! A few thousand glowing points that gather into a layered tree and burst
//! back into a cloud, with theme changes, a snow shower and fireworks on top.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tinsel::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     tinsel::run(SceneConfig::default())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Targets
//!
//! Every particle has two fixed destinations computed once: a spot on the
//! tree cone and a spot in the exploded cloud. See [`targets`].
//!
//! ### Pinch strength
//!
//! A single number in `[0, 1]` decides which destination pulls. Toggling
//! the formation eases it over 1.5 s; see [`formation`]. The
//! [`integrator`] applies the pull every tick.
//!
//! ### Effects
//!
//! Once the tree is formed, three [`Action`]s are available:
//!
//! | Action | Effect |
//! |--------|--------|
//! | [`Action::CycleTheme`] | recolor every particle from the next palette |
//! | [`Action::ToggleSnow`] | ten seconds of snowfall |
//! | [`Action::LaunchFireworks`] | a three-layer burst |
//!
//! ### Ticks
//!
//! The [`Scene`] always ticks at [`time::REFERENCE_TICK_RATE`] (60 Hz), the
//! rate its per-tick forces are tuned for, whatever the display refresh.
//! Config validation rejects any other `tick_rate`. Frame time is accumulated
//! and turned into whole ticks; see [`time::FixedStep`].
//!
//! ## Headless use
//!
//! Everything except [`viewer`] and [`gpu`] is plain CPU code, so a scene
//! can be driven from tests or tools without a window:
//!
//! ```ignore
//! let mut scene = Scene::new(SceneConfig { seed: Some(1), ..Default::default() })?;
//! scene.apply(Action::ToggleFormation);
//! for _ in 0..120 {
//!     scene.tick();
//! }
//! assert_eq!(scene.status().phase, Phase::Formed);
//! ```

pub mod config;
pub mod controls;
pub mod error;
pub mod fireworks;
pub mod formation;
pub mod gpu;
pub mod input;
pub mod integrator;
pub mod particles;
pub mod scene;
pub mod snow;
pub mod targets;
pub mod theme;
pub mod time;
pub mod viewer;

pub use glam::{Quat, Vec2, Vec3};
pub use scene::{Action, Scene, Status};
pub use viewer::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use tinsel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{DeviceProfile, SceneConfig};
    pub use crate::error::{ConfigError, GpuError, ViewerError};
    pub use crate::fireworks::{Firework, FireworkHandle, FireworkShow, LayerSpec};
    pub use crate::formation::{Formation, Phase};
    pub use crate::particles::{ParticleSet, PointVertex};
    pub use crate::scene::{Action, Scene, Status};
    pub use crate::snow::SnowField;
    pub use crate::targets::TreeShape;
    pub use crate::theme::Theme;
    pub use crate::time::{Clock, FixedStep};
    pub use crate::{Vec2, Vec3};
}
