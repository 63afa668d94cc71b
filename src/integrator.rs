//! Per-tick particle integration.
//!
//! Each tick every particle is pulled toward one of its two targets:
//!
//! 1. target = tree target if `pinch > 0.01`, else exploded target
//! 2. if further than 0.01 away, add a unit vector toward the target scaled
//!    by `0.35 * pinch` (forming) or a flat `0.25` (exploding)
//! 3. while exploding, add uniform jitter in `±0.015` per axis
//! 4. multiply velocity by `0.90`
//! 5. `position += velocity`
//!
//! Particles never interact, so the pass is a single linear sweep with no
//! ordering between particles. The force has a constant magnitude, so a
//! particle near its target settles into a small bounded orbit instead of
//! stopping; damping keeps that orbit from growing.

use glam::Vec3;
use rand::Rng;

use crate::particles::ParticleSet;

/// Pinch strength above which the tree target is active.
pub const FORMING_THRESHOLD: f32 = 0.01;
/// Distance below which no force is applied.
pub const ARRIVAL_DISTANCE: f32 = 0.01;
/// Force per tick toward the tree target at full pinch.
pub const FORM_FORCE: f32 = 0.35;
/// Force per tick toward the exploded target.
pub const EXPLODE_FORCE: f32 = 0.25;
/// Half-width of the per-axis velocity jitter while exploding.
pub const BROWNIAN_JITTER: f32 = 0.015;
/// Velocity multiplier applied every tick.
pub const DAMPING: f32 = 0.90;

/// Whether `pinch` selects the tree target.
#[inline]
pub fn is_forming(pinch: f32) -> bool {
    pinch > FORMING_THRESHOLD
}

/// Advance every particle in `set` by one tick.
pub fn step<R: Rng + ?Sized>(set: &mut ParticleSet, pinch: f32, rng: &mut R) {
    let forming = is_forming(pinch);
    let (targets, force) = if forming {
        (&set.tree_targets, FORM_FORCE * pinch)
    } else {
        (&set.exploded_targets, EXPLODE_FORCE)
    };

    for ((position, velocity), &target) in set
        .positions
        .iter_mut()
        .zip(set.velocities.iter_mut())
        .zip(targets.iter())
    {
        let offset = target - *position;
        let distance = offset.length();
        if distance > ARRIVAL_DISTANCE {
            *velocity += offset / distance * force;
        }

        if !forming {
            *velocity += Vec3::new(
                rng.gen_range(-BROWNIAN_JITTER..BROWNIAN_JITTER),
                rng.gen_range(-BROWNIAN_JITTER..BROWNIAN_JITTER),
                rng.gen_range(-BROWNIAN_JITTER..BROWNIAN_JITTER),
            );
        }

        *velocity *= DAMPING;
        *position += *velocity;
    }
}
