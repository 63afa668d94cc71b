//! Firework bursts.
//!
//! A launch picks one random origin and schedules one [`Firework`] per
//! [`LayerSpec`], staggered by [`LAYER_STAGGER`] seconds. Each firework owns
//! its own small buffers and lives for [`FIREWORK_LIFETIME`] seconds:
//!
//! - positions start at the origin, velocities point uniformly over a sphere
//! - every tick: integrate, pull down by gravity, apply air drag
//! - past 50% of its life the color blends toward white
//! - past 70% the opacity falls linearly to 0 at the end of its life
//!
//! Live fireworks sit in a [`FireworkShow`], a slot pool with generation
//! counters. Expired fireworks are released during the tick that notices
//! them, and their slot is reused by the next spawn.
//!
//! # Example
//!
//! ```ignore
//! let mut show = FireworkShow::new();
//! show.launch(&LayerSpec::DESKTOP, &mut rng);
//! for _ in 0..240 {
//!     show.tick(1.0 / 60.0, &mut rng);
//! }
//! assert!(show.is_idle());
//! ```

use glam::Vec3;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::particles::PointVertex;

/// Seconds a firework layer lives.
pub const FIREWORK_LIFETIME: f32 = 3.0;
/// Delay between consecutive layers of one launch (seconds).
pub const LAYER_STAGGER: f32 = 0.1;
/// Downward velocity change per tick.
pub const GRAVITY: f32 = 0.004;
/// Velocity multiplier per tick.
pub const AIR_DRAG: f32 = 0.98;
/// Life fraction after which colors start blending toward white.
pub const WHITEN_START: f32 = 0.5;
/// Life fraction after which opacity starts falling.
pub const FADE_START: f32 = 0.7;

/// Burst origins are drawn inside this box.
const ORIGIN_MIN: Vec3 = Vec3::new(-12.0, 4.0, -8.0);
const ORIGIN_MAX: Vec3 = Vec3::new(12.0, 14.0, 8.0);
/// Slowest particle of a layer, as a fraction of the layer speed.
const MIN_SPEED_FACTOR: f32 = 0.7;

/// One layer of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Particles in this layer.
    pub count: usize,
    /// Initial speed in units per tick.
    pub speed: f32,
    /// Sprite size.
    pub size: f32,
}

impl LayerSpec {
    pub const fn new(count: usize, speed: f32, size: f32) -> Self {
        Self { count, speed, size }
    }

    /// Layers used on desktop: 200 + 150 + 100 particles.
    pub const DESKTOP: [LayerSpec; 3] = [
        LayerSpec::new(200, 0.30, 0.35),
        LayerSpec::new(150, 0.22, 0.28),
        LayerSpec::new(100, 0.15, 0.22),
    ];

    /// Layers used on constrained devices.
    pub const MOBILE: [LayerSpec; 3] = [
        LayerSpec::new(100, 0.30, 0.35),
        LayerSpec::new(75, 0.22, 0.28),
        LayerSpec::new(50, 0.15, 0.22),
    ];
}

/// HSL to RGB, all components in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(1.0) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c * 0.5;
    Vec3::new(r + m, g + m, b + m)
}

fn random_hue<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    hsl_to_rgb(rng.gen(), 1.0, 0.6)
}

/// A single burst layer with its own buffers.
#[derive(Debug, Clone)]
pub struct Firework {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    base_colors: Vec<Vec3>,
    colors: Vec<Vec3>,
    /// Sprite size shared by every particle in the layer.
    size: f32,
    age: f32,
    lifetime: f32,
}

impl Firework {
    /// Spawn a layer at `origin` with colors blended between `hues.0` and `hues.1`.
    pub fn spawn<R: Rng + ?Sized>(origin: Vec3, spec: &LayerSpec, hues: (Vec3, Vec3), rng: &mut R) -> Self {
        let velocities = (0..spec.count)
            .map(|_| {
                let azimuth = rng.gen_range(0.0..TAU);
                // acos of a uniform value gives a uniform inclination over the sphere
                let inclination = rng.gen_range(-1.0f32..1.0).acos();
                let direction = Vec3::new(
                    inclination.sin() * azimuth.cos(),
                    inclination.sin() * azimuth.sin(),
                    inclination.cos(),
                );
                direction * spec.speed * rng.gen_range(MIN_SPEED_FACTOR..1.0)
            })
            .collect();
        let base_colors: Vec<Vec3> = (0..spec.count)
            .map(|_| hues.0.lerp(hues.1, rng.gen()))
            .collect();

        Self {
            positions: vec![origin; spec.count],
            velocities,
            colors: base_colors.clone(),
            base_colors,
            size: spec.size,
            age: 0.0,
            lifetime: FIREWORK_LIFETIME,
        }
    }

    /// Advance one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity;
            velocity.y -= GRAVITY;
            *velocity *= AIR_DRAG;
        }
        self.age += dt;

        let whiten = self.whiten_amount();
        if whiten > 0.0 {
            for (color, base) in self.colors.iter_mut().zip(&self.base_colors) {
                *color = base.lerp(Vec3::ONE, whiten);
            }
        }
    }

    /// Life fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    /// How far colors have blended toward white, in `[0, 1]`.
    pub fn whiten_amount(&self) -> f32 {
        ((self.progress() - WHITEN_START) / (1.0 - WHITEN_START)).clamp(0.0, 1.0)
    }

    /// 1 until [`FADE_START`], then linear down to 0 at the end of life.
    pub fn opacity(&self) -> f32 {
        let p = self.progress();
        if p < FADE_START {
            1.0
        } else {
            (1.0 - (p - FADE_START) / (1.0 - FADE_START)).clamp(0.0, 1.0)
        }
    }

    /// Whether the firework has outlived its lifetime.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime
    }

    #[inline]
    pub fn age(&self) -> f32 {
        self.age
    }

    #[inline]
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
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

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Append one vertex per particle to `out`.
    pub fn append_vertices(&self, out: &mut Vec<PointVertex>) {
        let alpha = self.opacity();
        out.extend(
            self.positions
                .iter()
                .zip(&self.colors)
                .map(|(&p, &c)| PointVertex::new(p, self.size, c, alpha)),
        );
    }
}

/// Stable reference to a live firework.
///
/// Goes stale once the firework is released, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FireworkHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    firework: Option<Firework>,
}

/// A layer waiting for its stagger delay.
#[derive(Debug, Clone)]
struct PendingLayer {
    delay: f32,
    origin: Vec3,
    spec: LayerSpec,
    hues: (Vec3, Vec3),
}

/// Pool of live fireworks plus layers still waiting to go off.
#[derive(Debug, Default)]
pub struct FireworkShow {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pending: Vec<PendingLayer>,
    live: usize,
}

impl FireworkShow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule one burst made of `layers` at a random origin.
    ///
    /// Layer `i` goes off `i * LAYER_STAGGER` seconds from now; the first
    /// one spawns immediately. Returns the burst origin.
    pub fn launch<R: Rng + ?Sized>(&mut self, layers: &[LayerSpec], rng: &mut R) -> Vec3 {
        let origin = Vec3::new(
            rng.gen_range(ORIGIN_MIN.x..ORIGIN_MAX.x),
            rng.gen_range(ORIGIN_MIN.y..ORIGIN_MAX.y),
            rng.gen_range(ORIGIN_MIN.z..ORIGIN_MAX.z),
        );

        for (i, spec) in layers.iter().enumerate() {
            let layer = PendingLayer {
                delay: i as f32 * LAYER_STAGGER,
                origin,
                spec: *spec,
                hues: (random_hue(rng), random_hue(rng)),
            };
            if layer.delay <= 0.0 {
                self.spawn(layer, rng);
            } else {
                self.pending.push(layer);
            }
        }

        debug!("firework launched at {:?} with {} layers", origin, layers.len());
        origin
    }

    /// Advance every live firework, release expired ones, then spawn layers
    /// whose delay has run out.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(firework) = slot.firework.as_mut() else {
                continue;
            };
            firework.tick(dt);
            if firework.is_expired() {
                slot.firework = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                self.live -= 1;
                debug!("firework slot {} released", index);
            }
        }

        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].delay -= dt;
            if self.pending[i].delay <= dt * 0.5 {
                let layer = self.pending.swap_remove(i);
                self.spawn(layer, rng);
            } else {
                i += 1;
            }
        }
    }

    fn spawn<R: Rng + ?Sized>(&mut self, layer: PendingLayer, rng: &mut R) -> FireworkHandle {
        let firework = Firework::spawn(layer.origin, &layer.spec, layer.hues, rng);
        self.live += 1;

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.firework = Some(firework);
                FireworkHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    firework: Some(firework),
                });
                FireworkHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        debug!("firework layer spawned in slot {}", handle.index);
        handle
    }

    /// Look up a live firework.
    pub fn get(&self, handle: FireworkHandle) -> Option<&Firework> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.firework.as_ref())
    }

    /// All live fireworks with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (FireworkHandle, &Firework)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.firework.as_ref().map(|firework| {
                (
                    FireworkHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    firework,
                )
            })
        })
    }

    /// Number of live fireworks.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of layers still waiting for their delay.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total particles across live fireworks.
    pub fn particle_count(&self) -> usize {
        self.iter().map(|(_, f)| f.len()).sum()
    }

    /// Nothing live and nothing pending.
    pub fn is_idle(&self) -> bool {
        self.live == 0 && self.pending.is_empty()
    }

    /// Drop every live firework and cancel pending layers.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.firework.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.pending.clear();
        self.live = 0;
    }

    /// Write vertices for every live firework into `out`, replacing its contents.
    pub fn write_vertices(&self, out: &mut Vec<PointVertex>) {
        out.clear();
        for (_, firework) in self.iter() {
            firework.append_vertices(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    const DT: f32 = 1.0 / 60.0;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(13)
    }

    fn single(count: usize) -> Firework {
        let spec = LayerSpec::new(count, 0.3, 0.3);
        Firework::spawn(Vec3::ZERO, &spec, (Vec3::X, Vec3::Y), &mut rng())
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(hsl_to_rgb(0.0, 1.0, 0.5).abs_diff_eq(Vec3::X, 1e-5));
        assert!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5).abs_diff_eq(Vec3::Y, 1e-5));
        assert!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5).abs_diff_eq(Vec3::Z, 1e-5));
        assert!(hsl_to_rgb(0.3, 0.0, 1.0).abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn test_spawn_at_origin_with_bounded_speed() {
        let f = single(500);
        assert!(f.positions().iter().all(|p| *p == Vec3::ZERO));
        for v in f.velocities() {
            let speed = v.length();
            assert!(speed >= 0.3 * MIN_SPEED_FACTOR - 1e-5 && speed <= 0.3 + 1e-5);
        }
    }

    #[test]
    fn test_layer_size_shared_by_all_vertices() {
        let spec = LayerSpec::new(40, 0.22, 0.28);
        let f = Firework::spawn(Vec3::ZERO, &spec, (Vec3::X, Vec3::Y), &mut rng());
        assert_eq!(f.size(), 0.28);

        let mut out = Vec::new();
        f.append_vertices(&mut out);
        assert_eq!(out.len(), 40);
        assert!(out.iter().all(|v| v.size == 0.28));
    }

    #[test]
    fn test_directions_cover_the_sphere() {
        let f = single(2000);
        let up = f.velocities().iter().filter(|v| v.y > 0.0).count();
        let front = f.velocities().iter().filter(|v| v.z > 0.0).count();
        assert!((800..1200).contains(&up));
        assert!((800..1200).contains(&front));
    }

    #[test]
    fn test_colors_blend_between_hues() {
        let f = single(300);
        for c in f.colors() {
            assert!((c.x + c.y - 1.0).abs() < 1e-5 && c.z == 0.0);
        }
    }

    #[test]
    fn test_gravity_and_drag() {
        let mut f = single(1);
        let v0 = f.velocities()[0];
        f.tick(DT);
        let v1 = f.velocities()[0];
        assert!((v1.y - (v0.y - GRAVITY) * AIR_DRAG).abs() < 1e-6);
        assert!((v1.x - v0.x * AIR_DRAG).abs() < 1e-6);
        assert_eq!(f.positions()[0], v0);
    }

    #[test]
    fn test_opacity_and_whitening_timeline() {
        let mut f = single(50);
        let start = f.colors().to_vec();

        for _ in 0..84 {
            f.tick(DT);
        }
        // 1.4 s: still fully opaque and original colors
        assert_eq!(f.opacity(), 1.0);
        assert_eq!(f.colors(), &start[..]);

        for _ in 0..60 {
            f.tick(DT);
        }
        // 2.4 s: whitening, fading
        assert!(f.whiten_amount() > 0.5);
        assert!(f.opacity() < 1.0 && f.opacity() > 0.0);
        assert!(f.colors()[0].min_element() > start[0].min_element());

        while !f.is_expired() {
            f.tick(DT);
        }
        assert_eq!(f.opacity(), 0.0);
        assert!(f.age() >= FIREWORK_LIFETIME);
    }

    #[test]
    fn test_desktop_burst_has_three_layers_of_450() {
        let mut rng = rng();
        let mut show = FireworkShow::new();
        show.launch(&LayerSpec::DESKTOP, &mut rng);

        assert_eq!(show.live_count(), 1);
        assert_eq!(show.pending_count(), 2);

        for _ in 0..13 {
            show.tick(DT, &mut rng);
        }
        assert_eq!(show.live_count(), 3);
        assert_eq!(show.pending_count(), 0);
        assert_eq!(show.particle_count(), 450);

        let mut counts: Vec<usize> = show.iter().map(|(_, f)| f.len()).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![100, 150, 200]);
    }

    #[test]
    fn test_layers_stagger_and_expire_after_lifetime() {
        let mut rng = rng();
        let mut show = FireworkShow::new();
        show.launch(&LayerSpec::DESKTOP, &mut rng);

        let mut first_seen: HashMap<FireworkHandle, u32> = HashMap::new();
        let mut last_seen: HashMap<FireworkHandle, (u32, f32)> = HashMap::new();
        for (h, f) in show.iter() {
            first_seen.insert(h, 0);
            last_seen.insert(h, (0, f.opacity()));
        }

        for tick in 1..=300u32 {
            show.tick(DT, &mut rng);
            for (h, f) in show.iter() {
                first_seen.entry(h).or_insert(tick);
                last_seen.insert(h, (tick, f.opacity()));
            }
        }

        assert!(show.is_idle());
        let mut spawns: Vec<u32> = first_seen.values().copied().collect();
        spawns.sort_unstable();
        assert_eq!(spawns, vec![0, 6, 12]);

        for (handle, spawn_tick) in &first_seen {
            let (last_tick, _) = last_seen[handle];
            let lived = (last_tick - spawn_tick + 1) as f32 * DT;
            assert!(lived >= FIREWORK_LIFETIME - 1e-3, "lived {}", lived);
            assert!(lived <= FIREWORK_LIFETIME + 2.0 * DT, "lived {}", lived);
            assert!(show.get(*handle).is_none());
        }
    }

    #[test]
    fn test_slot_reuse_invalidates_old_handle() {
        let mut rng = rng();
        let mut show = FireworkShow::new();
        show.launch(&[LayerSpec::new(10, 0.2, 0.2)], &mut rng);
        let (old, _) = show.iter().next().map(|(h, f)| (h, f.len())).expect("live firework");

        for _ in 0..200 {
            show.tick(DT, &mut rng);
        }
        assert!(show.get(old).is_none());

        show.launch(&[LayerSpec::new(10, 0.2, 0.2)], &mut rng);
        let (new, _) = show.iter().next().map(|(h, f)| (h, f.len())).expect("live firework");
        assert_eq!(show.slots.len(), 1);
        assert_ne!(old, new);
        assert!(show.get(new).is_some());
        assert!(show.get(old).is_none());
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut rng = rng();
        let mut show = FireworkShow::new();
        show.launch(&LayerSpec::DESKTOP, &mut rng);
        show.clear();
        assert!(show.is_idle());
        for _ in 0..30 {
            show.tick(DT, &mut rng);
        }
        assert_eq!(show.live_count(), 0);
    }

    #[test]
    fn test_vertices_carry_opacity() {
        let mut rng = rng();
        let mut show = FireworkShow::new();
        show.launch(&LayerSpec::MOBILE, &mut rng);
        for _ in 0..13 {
            show.tick(DT, &mut rng);
        }
        let mut out = Vec::new();
        show.write_vertices(&mut out);
        assert_eq!(out.len(), 225);
        assert!(out.iter().all(|v| v.alpha == 1.0));
    }
}
