//! Color themes for the tree.
//!
//! Each theme is an ordered list of `(threshold, color)` swatches. Drawing a
//! color rolls one uniform number and picks the first swatch whose threshold
//! the roll exceeds; the last swatch has threshold 0 and catches the rest.
//!
//! | Theme | Swatches |
//! |-------|----------|
//! | [`Theme::Classic`] | > 0.7 white, > 0.4 gold, > 0.25 red, else green |
//! | [`Theme::Frost`] | > 0.6 white, > 0.3 blue, else silver |
//! | [`Theme::Candy`] | > 0.6 white, > 0.3 pink, else purple |
//!
//! Switching themes replaces every color outright; nothing is blended.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::particles::ParticleSet;

/// A palette entry picked when the roll is above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub threshold: f32,
    pub color: Vec3,
}

const fn swatch(threshold: f32, r: f32, g: f32, b: f32) -> Swatch {
    Swatch {
        threshold,
        color: Vec3::new(r, g, b),
    }
}

const WHITE: Swatch = swatch(0.0, 1.0, 1.0, 1.0);

const CLASSIC: [Swatch; 4] = [
    Swatch { threshold: 0.7, ..WHITE },
    swatch(0.4, 1.0, 0.84, 0.0),  // Gold
    swatch(0.25, 0.9, 0.1, 0.15), // Red
    swatch(0.0, 0.1, 0.7, 0.25),  // Green
];

const FROST: [Swatch; 3] = [
    Swatch { threshold: 0.6, ..WHITE },
    swatch(0.3, 0.3, 0.6, 1.0),    // Blue
    swatch(0.0, 0.75, 0.78, 0.82), // Silver
];

const CANDY: [Swatch; 3] = [
    Swatch { threshold: 0.6, ..WHITE },
    swatch(0.3, 1.0, 0.45, 0.7), // Pink
    swatch(0.0, 0.6, 0.3, 0.9),  // Purple
];

/// The three built-in themes, cycled in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// White, gold, red and green.
    #[default]
    Classic,
    /// White, blue and silver.
    Frost,
    /// White, pink and purple.
    Candy,
}

impl Theme {
    /// All themes in cycle order.
    pub const ALL: [Theme; 3] = [Theme::Classic, Theme::Frost, Theme::Candy];

    /// Position in [`Theme::ALL`].
    pub fn index(self) -> usize {
        match self {
            Theme::Classic => 0,
            Theme::Frost => 1,
            Theme::Candy => 2,
        }
    }

    /// Theme at `index`, wrapping around.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// The theme after this one.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Classic => "Classic",
            Theme::Frost => "Frost",
            Theme::Candy => "Candy",
        }
    }

    /// Ordered swatches, highest threshold first.
    pub fn swatches(self) -> &'static [Swatch] {
        match self {
            Theme::Classic => &CLASSIC,
            Theme::Frost => &FROST,
            Theme::Candy => &CANDY,
        }
    }

    /// Color for a roll in `[0, 1)`.
    pub fn pick(self, roll: f32) -> Vec3 {
        let swatches = self.swatches();
        swatches
            .iter()
            .find(|s| roll > s.threshold)
            .unwrap_or(&swatches[swatches.len() - 1])
            .color
    }

    /// Draw one color from this theme's distribution.
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> Vec3 {
        self.pick(rng.gen())
    }

    /// Whether `color` is one of this theme's swatches.
    pub fn contains(self, color: Vec3) -> bool {
        self.swatches().iter().any(|s| s.color == color)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Redraw every particle's color from `theme`.
pub fn recolor<R: Rng + ?Sized>(set: &mut ParticleSet, theme: Theme, rng: &mut R) {
    for color in &mut set.colors {
        *color = theme.draw(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::TreeShape;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_cycle_order() {
        assert_eq!(Theme::Classic.next(), Theme::Frost);
        assert_eq!(Theme::Frost.next(), Theme::Candy);
        assert_eq!(Theme::Candy.next(), Theme::Classic);
        assert_eq!(Theme::from_index(4), Theme::Frost);
    }

    #[test]
    fn test_thresholds_classic() {
        let t = Theme::Classic;
        assert_eq!(t.pick(0.95), Vec3::ONE);
        assert_eq!(t.pick(0.5), CLASSIC[1].color);
        assert_eq!(t.pick(0.3), CLASSIC[2].color);
        assert_eq!(t.pick(0.1), CLASSIC[3].color);
        // Strictly greater: a roll sitting on a threshold falls through.
        assert_eq!(t.pick(0.7), CLASSIC[1].color);
        assert_eq!(t.pick(0.0), CLASSIC[3].color);
    }

    #[test]
    fn test_thresholds_two_tier_themes() {
        for theme in [Theme::Frost, Theme::Candy] {
            let s = theme.swatches();
            assert_eq!(theme.pick(0.61), s[0].color);
            assert_eq!(theme.pick(0.45), s[1].color);
            assert_eq!(theme.pick(0.2), s[2].color);
        }
    }

    #[test]
    fn test_last_swatch_catches_everything() {
        for theme in Theme::ALL {
            assert_eq!(theme.swatches().last().map(|s| s.threshold), Some(0.0));
        }
    }

    #[test]
    fn test_recolor_uses_only_new_palette() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut set = ParticleSet::generate(3000, &TreeShape::default(), 40.0, Theme::Classic, &mut rng);

        recolor(&mut set, Theme::Candy, &mut rng);
        assert!(set.colors().iter().all(|&c| Theme::Candy.contains(c)));
        // Gold, red and green are Classic-only.
        for s in &CLASSIC[1..] {
            assert!(!set.colors().contains(&s.color));
        }
    }

    #[test]
    fn test_distribution_roughly_matches_thresholds() {
        let mut rng = SmallRng::seed_from_u64(5);
        let draws = 20_000;
        let whites = (0..draws)
            .filter(|_| Theme::Frost.draw(&mut rng) == Vec3::ONE)
            .count();
        let share = whites as f32 / draws as f32;
        assert!((share - 0.4).abs() < 0.03, "white share {}", share);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Theme::Frost).ok().as_deref(), Some("\"frost\""));
    }
}
