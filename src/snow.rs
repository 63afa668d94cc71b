//! Snowfall overlay.
//!
//! A fixed pool of flakes that falls while visible. Triggering reveals the
//! field for [`SNOW_DURATION`] seconds of simulated time; a second trigger
//! during that window is ignored. Flakes that pass [`FLOOR`] respawn at a
//! random spot above the scene, so the fixed pool can fall forever.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::particles::PointVertex;

/// How long one trigger keeps the snow visible (seconds).
pub const SNOW_DURATION: f32 = 10.0;
/// Flakes below this height wrap back to the top.
pub const FLOOR: f32 = -15.0;
/// Lowest respawn height.
pub const CEILING: f32 = 20.0;
/// Extra random height added on respawn.
const RESPAWN_BAND: f32 = 5.0;
/// Half-width of the snow volume on x and z.
pub const HALF_WIDTH: f32 = 25.0;

const FLAKE_SIZE: f32 = 0.15;
const FLAKE_ALPHA: f32 = 0.8;
const MIN_FALL: f32 = 0.03;
const MAX_FALL: f32 = 0.08;
const SWAY: f32 = 0.02;

/// Snow particle pool with a visibility window.
#[derive(Debug, Clone)]
pub struct SnowField {
    positions: Vec<Vec3>,
    /// Per-flake base fall speed (units per tick).
    speeds: Vec<f32>,
    /// Per-flake phase offset for the sinusoids.
    phases: Vec<f32>,
    /// Seconds left in the visible window, `None` when hidden.
    remaining: Option<f32>,
    /// Seconds spent falling, drives the sinusoids.
    clock: f32,
}

impl SnowField {
    /// Scatter `count` flakes through the snow volume. Starts hidden.
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-HALF_WIDTH..HALF_WIDTH),
                    rng.gen_range(FLOOR..CEILING + RESPAWN_BAND),
                    rng.gen_range(-HALF_WIDTH..HALF_WIDTH),
                )
            })
            .collect();
        let speeds = (0..count).map(|_| rng.gen_range(MIN_FALL..MAX_FALL)).collect();
        let phases = (0..count).map(|_| rng.gen_range(0.0..std::f32::consts::TAU)).collect();

        Self {
            positions,
            speeds,
            phases,
            remaining: None,
            clock: 0.0,
        }
    }

    /// Reveal the snow for [`SNOW_DURATION`] seconds.
    ///
    /// Returns `false` (and changes nothing) if it is already visible.
    pub fn trigger(&mut self) -> bool {
        if self.remaining.is_some() {
            return false;
        }
        self.remaining = Some(SNOW_DURATION);
        true
    }

    /// Hide immediately and drop the running window.
    pub fn hide(&mut self) {
        self.remaining = None;
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left in the visible window, 0 when hidden.
    pub fn remaining(&self) -> f32 {
        self.remaining.unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Advance one tick of `dt` seconds.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let Some(remaining) = self.remaining else {
            return;
        };

        // Both sway terms repeat every TAU.
        self.clock = (self.clock + dt).rem_euclid(TAU);
        let t = self.clock;
        for ((position, &speed), &phase) in self
            .positions
            .iter_mut()
            .zip(&self.speeds)
            .zip(&self.phases)
        {
            position.y -= speed * (1.0 + 0.5 * (t * 2.0 + phase).sin());
            position.x += SWAY * (t + phase).sin();

            if position.y < FLOOR {
                *position = Vec3::new(
                    rng.gen_range(-HALF_WIDTH..HALF_WIDTH),
                    CEILING + rng.gen::<f32>() * RESPAWN_BAND,
                    rng.gen_range(-HALF_WIDTH..HALF_WIDTH),
                );
            }
        }

        let left = remaining - dt;
        // Closes within half a tick of zero.
        self.remaining = if left > dt * 0.5 { Some(left) } else { None };
    }

    /// Write one vertex per flake into `out`, or nothing if hidden.
    pub fn write_vertices(&self, out: &mut Vec<PointVertex>) {
        out.clear();
        if !self.is_visible() {
            return;
        }
        out.extend(
            self.positions
                .iter()
                .map(|&p| PointVertex::new(p, FLAKE_SIZE, Vec3::ONE, FLAKE_ALPHA)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn field(count: usize) -> (SnowField, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(9);
        (SnowField::new(count, &mut rng), rng)
    }

    #[test]
    fn test_clock_stays_within_one_period() {
        let (mut snow, mut rng) = field(4);
        snow.clock = TAU - DT * 0.5;
        snow.trigger();
        snow.tick(DT, &mut rng);
        assert!(snow.clock >= 0.0 && snow.clock < TAU, "clock {}", snow.clock);
        assert!((snow.clock - DT * 0.5).abs() < 1e-4);

        for _ in 0..599 {
            snow.tick(DT, &mut rng);
            assert!(snow.clock < TAU);
        }
    }

    #[test]
    fn test_starts_hidden() {
        let (snow, _) = field(100);
        assert!(!snow.is_visible());
        assert_eq!(snow.remaining(), 0.0);
    }

    #[test]
    fn test_retrigger_is_noop() {
        let (mut snow, mut rng) = field(10);
        assert!(snow.trigger());
        for _ in 0..60 {
            snow.tick(DT, &mut rng);
        }
        let left = snow.remaining();
        assert!(!snow.trigger());
        assert_eq!(snow.remaining(), left);
    }

    #[test]
    fn test_visible_for_ten_seconds() {
        let (mut snow, mut rng) = field(10);
        snow.trigger();
        let mut visible_ticks = 0;
        for _ in 0..900 {
            if !snow.is_visible() {
                break;
            }
            snow.tick(DT, &mut rng);
            visible_ticks += 1;
        }
        assert_eq!(visible_ticks, 600);
        assert!(!snow.is_visible());
        // Can be triggered again once the window closes.
        assert!(snow.trigger());
    }

    #[test]
    fn test_hidden_snow_does_not_move() {
        let (mut snow, mut rng) = field(50);
        let before = snow.positions().to_vec();
        snow.tick(DT, &mut rng);
        assert_eq!(snow.positions(), &before[..]);
    }

    #[test]
    fn test_flakes_wrap_above_floor() {
        let (mut snow, mut rng) = field(300);
        for _ in 0..20 {
            snow.trigger();
            for _ in 0..600 {
                snow.tick(DT, &mut rng);
                assert!(snow.positions().iter().all(|p| p.y >= FLOOR));
            }
        }
    }

    #[test]
    fn test_flakes_fall() {
        let (mut snow, mut rng) = field(200);
        snow.positions.iter_mut().for_each(|p| p.y = 10.0);
        snow.trigger();
        for _ in 0..30 {
            snow.tick(DT, &mut rng);
        }
        assert!(snow.positions().iter().all(|p| p.y < 10.0));
    }

    #[test]
    fn test_vertices_only_when_visible() {
        let (mut snow, _) = field(40);
        let mut out = Vec::new();
        snow.write_vertices(&mut out);
        assert!(out.is_empty());

        snow.trigger();
        snow.write_vertices(&mut out);
        assert_eq!(out.len(), 40);
    }
}
