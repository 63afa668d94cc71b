//! The whole simulation in one place.
//!
//! [`Scene`] owns the tree particles, the formation and rotation state, the
//! snow field and the firework show. It is driven by two kinds of input:
//!
//! - [`Scene::apply`] with one of the four [`Action`]s
//! - pointer drags via [`Scene::begin_drag`], [`Scene::drag`], [`Scene::end_drag`]
//!
//! and advanced by [`Scene::update`], which turns frame time into fixed
//! ticks. Each tick runs, in order: formation tween, particle integration,
//! rotation, snow, fireworks.
//!
//! # Example
//!
//! ```ignore
//! use tinsel::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default())?;
//! scene.apply(Action::ToggleFormation);
//! scene.update(1.0 / 60.0);
//! println!("{}", scene.status());
//! ```

use std::fmt;

use glam::{Quat, Vec2};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::SceneConfig;
use crate::controls::Rotation;
use crate::error::ConfigError;
use crate::fireworks::{FireworkShow, LayerSpec};
use crate::formation::{Formation, Phase};
use crate::integrator;
use crate::particles::ParticleSet;
use crate::snow::SnowField;
use crate::theme::{recolor, Theme};
use crate::time::FixedStep;

/// The four user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Switch between tree and cloud.
    ToggleFormation,
    /// Recolor with the next theme. Needs the tree formed.
    CycleTheme,
    /// Start a snow window. Needs the tree formed and no snow falling.
    ToggleSnow,
    /// Fire one burst. Needs the tree formed.
    LaunchFireworks,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::ToggleFormation,
        Action::CycleTheme,
        Action::ToggleSnow,
        Action::LaunchFireworks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::ToggleFormation => "toggle formation",
            Action::CycleTheme => "cycle theme",
            Action::ToggleSnow => "snow",
            Action::LaunchFireworks => "fireworks",
        }
    }
}

/// What the status line shows: theme name and formation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub theme: Theme,
    pub phase: Phase,
    pub snowing: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} · {}", self.theme.name(), self.phase.name())?;
        if self.snowing {
            write!(f, " · Snowing")?;
        }
        Ok(())
    }
}

/// Tree, effects and controls.
#[derive(Debug)]
pub struct Scene {
    particles: ParticleSet,
    formation: Formation,
    rotation: Rotation,
    theme: Theme,
    snow: SnowField,
    fireworks: FireworkShow,
    layers: Vec<LayerSpec>,
    step: FixedStep,
    ticks: u64,
    rng: SmallRng,
    torn_down: bool,
}

impl Scene {
    /// Build a scene from a validated config.
    ///
    /// Uses `config.seed` when set, otherwise seeds from the OS.
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Build a scene drawing every random number from `rng`.
    pub fn with_rng(config: SceneConfig, mut rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.resolved_particle_count();
        let particles = ParticleSet::generate(count, &config.tree, config.explode_spread, config.theme, &mut rng);
        let snow = SnowField::new(config.resolved_snow_count(), &mut rng);

        info!(
            "scene ready: {:?} profile, {} tree particles, {} snowflakes, {} Hz",
            config.profile,
            particles.len(),
            snow.len(),
            config.tick_rate
        );

        Ok(Self {
            particles,
            formation: Formation::new(),
            rotation: Rotation::new(),
            theme: config.theme,
            snow,
            fireworks: FireworkShow::new(),
            layers: config.resolved_firework_layers(),
            step: FixedStep::new(config.tick_rate, config.max_catch_up_ticks),
            ticks: 0,
            rng,
            torn_down: false,
        })
    }

    /// Apply a user action. Returns whether it changed anything.
    pub fn apply(&mut self, action: Action) -> bool {
        if self.torn_down {
            return false;
        }

        let applied = match action {
            Action::ToggleFormation => {
                let formed = self.formation.toggle();
                info!("formation: {}", if formed { "forming tree" } else { "exploding" });
                true
            }
            _ if !self.formation.is_formed() => false,
            Action::CycleTheme => {
                self.theme = self.theme.next();
                recolor(&mut self.particles, self.theme, &mut self.rng);
                info!("theme: {}", self.theme);
                true
            }
            Action::ToggleSnow => self.snow.trigger(),
            Action::LaunchFireworks => {
                self.fireworks.launch(&self.layers, &mut self.rng);
                true
            }
        };

        if !applied {
            debug!("ignored action: {}", action.label());
        }
        applied
    }

    /// Whether `action` would do anything right now.
    pub fn is_available(&self, action: Action) -> bool {
        if self.torn_down {
            return false;
        }
        match action {
            Action::ToggleFormation => true,
            Action::CycleTheme | Action::LaunchFireworks => self.formation.is_formed(),
            Action::ToggleSnow => self.formation.is_formed() && !self.snow.is_visible(),
        }
    }

    pub fn begin_drag(&mut self) {
        if !self.torn_down {
            self.rotation.begin_drag();
        }
    }

    /// Pointer moved by `delta` screen pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.rotation.drag(delta);
    }

    pub fn end_drag(&mut self) {
        self.rotation.end_drag();
    }

    /// Feed `dt` seconds of wall time and run the ticks it adds up to.
    ///
    /// Returns the number of ticks run.
    pub fn update(&mut self, dt: f32) -> u32 {
        if self.torn_down {
            return 0;
        }
        let ticks = self.step.accumulate(dt);
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    /// Run exactly one fixed tick.
    pub fn tick(&mut self) {
        if self.torn_down {
            return;
        }
        let dt = self.step.step();

        self.formation.advance(dt);
        integrator::step(&mut self.particles, self.formation.pinch_strength(), &mut self.rng);
        self.rotation.tick(self.formation.is_formed());
        self.snow.tick(dt, &mut self.rng);
        self.fireworks.tick(dt, &mut self.rng);

        self.ticks += 1;
    }

    /// Cancel every running effect. The scene ignores all input afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.fireworks.clear();
        self.snow.hide();
        self.rotation.end_drag();
        self.step.reset();
        self.torn_down = true;
        info!("scene torn down after {} ticks", self.ticks);
    }

    pub fn status(&self) -> Status {
        Status {
            theme: self.theme,
            phase: self.formation.phase(),
            snowing: self.snow.is_visible(),
        }
    }

    #[inline]
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    #[inline]
    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    #[inline]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Orientation applied to the tree group.
    #[inline]
    pub fn tree_orientation(&self) -> Quat {
        self.rotation.quat()
    }

    #[inline]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[inline]
    pub fn snow(&self) -> &SnowField {
        &self.snow
    }

    #[inline]
    pub fn fireworks(&self) -> &FireworkShow {
        &self.fireworks
    }

    #[inline]
    pub fn is_formed(&self) -> bool {
        self.formation.is_formed()
    }

    #[inline]
    pub fn pinch_strength(&self) -> f32 {
        self.formation.pinch_strength()
    }

    /// Seconds per tick.
    #[inline]
    pub fn tick_seconds(&self) -> f32 {
        self.step.step()
    }

    /// Ticks run since creation.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds since creation.
    pub fn sim_time(&self) -> f64 {
        self.ticks as f64 * self.step.step() as f64
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        let config = SceneConfig {
            particle_count: Some(300),
            snow_count: Some(50),
            seed: Some(1),
            ..SceneConfig::default()
        };
        Scene::new(config).unwrap()
    }

    fn run_ticks(scene: &mut Scene, ticks: u32) {
        for _ in 0..ticks {
            scene.tick();
        }
    }

    #[test]
    fn test_starts_scattered() {
        let s = scene();
        assert_eq!(s.status().phase, Phase::Scattered);
        assert_eq!(s.particles().positions(), s.particles().exploded_targets());
        assert_eq!(s.status().to_string(), "Classic · Scattered");
    }

    #[test]
    fn test_effects_gated_until_formed() {
        let mut s = scene();
        assert!(!s.apply(Action::CycleTheme));
        assert!(!s.apply(Action::ToggleSnow));
        assert!(!s.apply(Action::LaunchFireworks));
        assert_eq!(s.theme(), Theme::Classic);
        assert!(s.fireworks().is_idle());

        assert!(s.apply(Action::ToggleFormation));
        assert!(s.is_available(Action::CycleTheme));
        assert!(s.apply(Action::CycleTheme));
        assert_eq!(s.theme(), Theme::Frost);
    }

    #[test]
    fn test_snow_not_retriggered_while_falling() {
        let mut s = scene();
        s.apply(Action::ToggleFormation);
        assert!(s.apply(Action::ToggleSnow));
        assert!(!s.is_available(Action::ToggleSnow));
        assert!(!s.apply(Action::ToggleSnow));
        assert_eq!(s.status().to_string(), "Classic · Converging · Snowing");
    }

    #[test]
    fn test_status_reaches_formed() {
        let mut s = scene();
        s.apply(Action::ToggleFormation);
        run_ticks(&mut s, 91);
        assert_eq!(s.status().phase, Phase::Formed);
        assert_eq!(s.pinch_strength(), 1.0);
    }

    #[test]
    fn test_update_uses_fixed_ticks() {
        let mut s = scene();
        assert_eq!(s.update(1.0 / 30.0), 2);
        assert_eq!(s.update(1.0 / 120.0), 0);
        assert_eq!(s.update(1.0 / 120.0), 1);
        assert_eq!(s.tick_count(), 3);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut s = scene();
        s.apply(Action::ToggleFormation);
        s.apply(Action::ToggleSnow);
        s.apply(Action::LaunchFireworks);
        s.teardown();

        assert!(!s.snow().is_visible());
        assert!(s.fireworks().is_idle());
        assert!(!s.apply(Action::ToggleFormation));
        assert_eq!(s.update(1.0), 0);

        let before = s.particles().positions().to_vec();
        s.tick();
        assert_eq!(s.particles().positions(), &before[..]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            tick_rate: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(Scene::new(config), Err(ConfigError::Invalid(_))));
    }
}
