//! Target shapes for the tree particles.
//!
//! Every particle has two fixed destinations computed once at creation:
//!
//! - a **tree target**: a layered cone built from golden-angle spirals, with
//!   uniform-area disk sampling inside each layer and a small droop so the
//!   outer branches sag.
//! - an **exploded target**: a cloud position derived from a deterministic
//!   hash of the particle index, so regenerating a set reproduces it exactly.
//!
//! # Example
//!
//! ```ignore
//! use tinsel::targets::{exploded_target, tree_target, TreeShape};
//!
//! let shape = TreeShape::default();
//! let cloud = exploded_target(42, 40.0);
//! let branch = tree_target(42, 10_000, &shape, &mut rng);
//! ```

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Angle increment between consecutive particles (radians).
///
/// `π (3 - √5)`: spreads points evenly around the trunk without forming spokes.
pub const GOLDEN_ANGLE: f64 = 2.399963229728653;

/// Share of the power curve in the layer radius falloff.
const POWER_BLEND: f32 = 0.4;

/// Exponent of the power part of the falloff.
const FALLOFF_EXPONENT: f32 = 1.3;

/// How strongly the random-layer redistribution kicks in toward the end of the set.
const REDISTRIBUTION_BIAS: f32 = 0.7;

/// Dimensions of the tree cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    /// Total height of the cone, centered on y = 0.
    pub height: f32,
    /// Radius of the bottom layer.
    pub radius: f32,
    /// Downward offset per unit of distance from the trunk.
    pub droop: f32,
    /// Full width of the random vertical jitter.
    pub vertical_jitter: f32,
    /// Full width of the random depth (z) jitter.
    pub depth_jitter: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 14.0,
            radius: 5.5,
            droop: 0.12,
            vertical_jitter: 0.4,
            depth_jitter: 0.3,
        }
    }
}

impl TreeShape {
    /// Maximum radius for a layer fraction in `[0, 1]` (0 = bottom).
    ///
    /// Blends a linear taper with a `1.3` power taper so the middle of the
    /// tree stays fuller than a straight cone.
    pub fn layer_radius(&self, layer: f32) -> f32 {
        let falloff = (1.0 - layer).clamp(0.0, 1.0);
        let curve = falloff * (1.0 - POWER_BLEND) + falloff.powf(FALLOFF_EXPONENT) * POWER_BLEND;
        self.radius * curve
    }

    /// Lowest y a tree target can reach, droop and jitter included.
    pub fn floor(&self) -> f32 {
        -self.height * 0.5 - self.radius * self.droop - self.vertical_jitter * 0.5
    }
}

/// Deterministic hash in `[0, 1)`.
///
/// `frac(sin(12.9898x + 78.233y + 37.719z) * 43758.5453)`, evaluated in
/// double precision so large indices still land on distinct values.
pub fn noise3d(x: f32, y: f32, z: f32) -> f32 {
    let v = ((x as f64) * 12.9898 + (y as f64) * 78.233 + (z as f64) * 37.719).sin() * 43758.5453;
    let frac = (v - v.floor()) as f32;
    // f64 -> f32 can round 0.99999999 up to 1.0
    if frac >= 1.0 {
        0.0
    } else {
        frac
    }
}

/// Exploded-cloud position of particle `index`.
///
/// Each axis is an independent hash of the index, centered and scaled by
/// `spread`. Pure function of its inputs.
pub fn exploded_target(index: usize, spread: f32) -> Vec3 {
    let i = index as f32;
    Vec3::new(
        noise3d(i, 0.0, 0.0) - 0.5,
        noise3d(0.0, i, 0.0) - 0.5,
        noise3d(0.0, 0.0, i) - 0.5,
    ) * spread
}

/// Tree position of particle `index` out of `count`.
///
/// The layer fraction is normally `index / count`, but with probability
/// `0.7 * index / count` a fresh random layer is drawn instead, so later
/// particles fill in the whole cone rather than piling onto the tip.
pub fn tree_target<R: Rng + ?Sized>(index: usize, count: usize, shape: &TreeShape, rng: &mut R) -> Vec3 {
    let progress = if count == 0 {
        0.0
    } else {
        index as f32 / count as f32
    };

    let layer = if rng.gen::<f32>() > 1.0 - progress * REDISTRIBUTION_BIAS {
        rng.gen::<f32>()
    } else {
        progress
    };

    let max_radius = shape.layer_radius(layer);
    // sqrt for uniform density over the layer's disk
    let r = max_radius * rng.gen::<f32>().sqrt();
    let angle = ((index as f64) * GOLDEN_ANGLE) % std::f64::consts::TAU;
    let (sin_a, cos_a) = (angle as f32).sin_cos();

    let droop = -r * shape.droop;
    let y_jitter = (rng.gen::<f32>() - 0.5) * shape.vertical_jitter;
    let z_jitter = (rng.gen::<f32>() - 0.5) * shape.depth_jitter;

    Vec3::new(
        r * cos_a,
        layer * shape.height - shape.height * 0.5 + droop + y_jitter,
        r * sin_a + z_jitter,
    )
}

/// Tree targets for a whole set of `count` particles.
pub fn tree_targets<R: Rng + ?Sized>(count: usize, shape: &TreeShape, rng: &mut R) -> Vec<Vec3> {
    (0..count).map(|i| tree_target(i, count, shape, rng)).collect()
}

/// Exploded targets for a whole set of `count` particles.
pub fn exploded_targets(count: usize, spread: f32) -> Vec<Vec3> {
    (0..count).map(|i| exploded_target(i, spread)).collect()
}
