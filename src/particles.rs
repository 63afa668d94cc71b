//! Particle storage for the tree.
//!
//! [`ParticleSet`] keeps every per-particle attribute in its own flat array,
//! indexed by particle id. All arrays share one length, fixed at creation.
//! [`PointVertex`] is the GPU-facing layout the renderer uploads each frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

use crate::targets::{exploded_targets, tree_targets, TreeShape};
use crate::theme::Theme;

/// Smallest sprite size handed out at creation.
pub const MIN_SIZE: f32 = 0.05;
/// Largest sprite size handed out at creation.
pub const MAX_SIZE: f32 = 0.15;
/// Lowest per-particle alpha handed out at creation.
pub const MIN_ALPHA: f32 = 0.6;

/// One point sprite as laid out in the vertex buffer.
///
/// 32 bytes: position (12) + size (4) + color (12) + alpha (4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl PointVertex {
    pub fn new(position: Vec3, size: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            size,
            color: color.to_array(),
            alpha,
        }
    }
}

/// Structure-of-arrays particle buffers.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) tree_targets: Vec<Vec3>,
    pub(crate) exploded_targets: Vec<Vec3>,
    pub(crate) colors: Vec<Vec3>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) alphas: Vec<f32>,
}

impl ParticleSet {
    /// Build a set of `count` particles.
    ///
    /// Live positions start at the exploded targets with zero velocity, so
    /// the scene begins scattered. Colors are drawn from `theme`.
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        shape: &TreeShape,
        spread: f32,
        theme: Theme,
        rng: &mut R,
    ) -> Self {
        let tree_targets = tree_targets(count, shape, rng);
        let exploded_targets = exploded_targets(count, spread);

        let colors = (0..count).map(|_| theme.draw(rng)).collect();
        let sizes = (0..count).map(|_| rng.gen_range(MIN_SIZE..MAX_SIZE)).collect();
        let alphas = (0..count).map(|_| rng.gen_range(MIN_ALPHA..1.0)).collect();

        Self {
            positions: exploded_targets.clone(),
            velocities: vec![Vec3::ZERO; count],
            tree_targets,
            exploded_targets,
            colors,
            sizes,
            alphas,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn tree_targets(&self) -> &[Vec3] {
        &self.tree_targets
    }

    pub fn exploded_targets(&self) -> &[Vec3] {
        &self.exploded_targets
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    /// Write one vertex per particle into `out`, replacing its contents.
    pub fn write_vertices(&self, out: &mut Vec<PointVertex>) {
        out.clear();
        out.extend(
            self.positions
                .iter()
                .zip(&self.sizes)
                .zip(&self.colors)
                .zip(&self.alphas)
                .map(|(((&p, &s), &c), &a)| PointVertex::new(p, s, c, a)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample(count: usize) -> ParticleSet {
        let mut rng = SmallRng::seed_from_u64(3);
        ParticleSet::generate(count, &TreeShape::default(), 40.0, Theme::Classic, &mut rng)
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<PointVertex>(), 32);
        assert_eq!(std::mem::offset_of!(PointVertex, size), 12);
        assert_eq!(std::mem::offset_of!(PointVertex, color), 16);
        assert_eq!(std::mem::offset_of!(PointVertex, alpha), 28);
    }

    #[test]
    fn test_arrays_share_length() {
        let set = sample(1234);
        assert_eq!(set.len(), 1234);
        assert_eq!(set.velocities().len(), 1234);
        assert_eq!(set.tree_targets().len(), 1234);
        assert_eq!(set.exploded_targets().len(), 1234);
        assert_eq!(set.colors().len(), 1234);
        assert_eq!(set.sizes().len(), 1234);
        assert_eq!(set.alphas().len(), 1234);
    }

    #[test]
    fn test_starts_scattered_and_at_rest() {
        let set = sample(500);
        assert_eq!(set.positions(), set.exploded_targets());
        assert!(set.velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_size_and_alpha_ranges() {
        let set = sample(2000);
        assert!(set.sizes().iter().all(|s| (MIN_SIZE..MAX_SIZE).contains(s)));
        assert!(set.alphas().iter().all(|a| (MIN_ALPHA..1.0).contains(a)));
    }

    #[test]
    fn test_write_vertices() {
        let set = sample(64);
        let mut out = vec![PointVertex::default(); 3];
        set.write_vertices(&mut out);

        assert_eq!(out.len(), 64);
        assert_eq!(out[10].position, set.positions()[10].to_array());
        assert_eq!(out[10].size, set.sizes()[10]);
        assert_eq!(out[10].color, set.colors()[10].to_array());
        assert_eq!(out[10].alpha, set.alphas()[10]);
    }

    #[test]
    fn test_empty_set() {
        let set = sample(0);
        assert!(set.is_empty());
        let mut out = Vec::new();
        set.write_vertices(&mut out);
        assert!(out.is_empty());
    }
}
