//! Scene configuration.
//!
//! A [`SceneConfig`] can be written to and read from JSON. Every field has a
//! default, so a partial file (or `{}`) is valid. Counts left unset fall back
//! to the [`DeviceProfile`].
//!
//! ```json
//! {
//!   "profile": "mobile",
//!   "theme": "frost",
//!   "tree": { "height": 16.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::fireworks::LayerSpec;
use crate::targets::TreeShape;
use crate::theme::Theme;
use crate::time::REFERENCE_TICK_RATE;

/// Hardware class that picks particle counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceProfile {
    #[default]
    Desktop,
    /// Roughly half the particles for phones and small GPUs.
    Mobile,
}

impl DeviceProfile {
    pub fn particle_count(self) -> usize {
        match self {
            DeviceProfile::Desktop => 12_000,
            DeviceProfile::Mobile => 6_000,
        }
    }

    pub fn snow_count(self) -> usize {
        match self {
            DeviceProfile::Desktop => 1_500,
            DeviceProfile::Mobile => 600,
        }
    }

    pub fn firework_layers(self) -> &'static [LayerSpec] {
        match self {
            DeviceProfile::Desktop => &LayerSpec::DESKTOP,
            DeviceProfile::Mobile => &LayerSpec::MOBILE,
        }
    }
}

/// Everything needed to build a [`Scene`](crate::scene::Scene).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub profile: DeviceProfile,
    /// Tree particles, profile default when unset.
    pub particle_count: Option<usize>,
    /// Snowflakes, profile default when unset.
    pub snow_count: Option<usize>,
    pub tree: TreeShape,
    /// Full edge length of the exploded cloud, centred on the origin.
    pub explode_spread: f32,
    /// Simulation ticks per second. Only [`REFERENCE_TICK_RATE`] is accepted.
    pub tick_rate: f32,
    /// Most ticks run for a single rendered frame.
    pub max_catch_up_ticks: u32,
    /// Burst layers, profile default when unset.
    pub firework_layers: Option<Vec<LayerSpec>>,
    /// Theme the tree starts with.
    pub theme: Theme,
    /// RNG seed, random when unset.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            profile: DeviceProfile::Desktop,
            particle_count: None,
            snow_count: None,
            tree: TreeShape::default(),
            explode_spread: 40.0,
            tick_rate: REFERENCE_TICK_RATE,
            max_catch_up_ticks: 8,
            firework_layers: None,
            theme: Theme::Classic,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Defaults for a profile.
    pub fn for_profile(profile: DeviceProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Per-tick constants only hold at the reference rate.
        if self.tick_rate != REFERENCE_TICK_RATE {
            return Err(invalid(format!(
                "tick_rate must be {}, got {}",
                REFERENCE_TICK_RATE, self.tick_rate
            )));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(invalid("max_catch_up_ticks must be at least 1"));
        }
        if !(self.explode_spread.is_finite() && self.explode_spread > 0.0) {
            return Err(invalid("explode_spread must be positive"));
        }

        let tree = &self.tree;
        for (name, value) in [("height", tree.height), ("radius", tree.radius)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("tree.{} must be positive, got {}", name, value)));
            }
        }
        for (name, value) in [
            ("droop", tree.droop),
            ("vertical_jitter", tree.vertical_jitter),
            ("depth_jitter", tree.depth_jitter),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("tree.{} must be non-negative, got {}", name, value)));
            }
        }

        if let Some(layers) = &self.firework_layers {
            if layers.is_empty() {
                return Err(invalid("firework_layers must not be empty"));
            }
            for (i, layer) in layers.iter().enumerate() {
                if !(layer.speed.is_finite() && layer.speed >= 0.0) {
                    return Err(invalid(format!("firework_layers[{}].speed must be non-negative", i)));
                }
                if !(layer.size.is_finite() && layer.size > 0.0) {
                    return Err(invalid(format!("firework_layers[{}].size must be positive", i)));
                }
            }
        }
        Ok(())
    }

    pub fn resolved_particle_count(&self) -> usize {
        self.particle_count.unwrap_or_else(|| self.profile.particle_count())
    }

    pub fn resolved_snow_count(&self) -> usize {
        self.snow_count.unwrap_or_else(|| self.profile.snow_count())
    }

    pub fn resolved_firework_layers(&self) -> Vec<LayerSpec> {
        match &self.firework_layers {
            Some(layers) => layers.clone(),
            None => self.profile.firework_layers().to_vec(),
        }
    }

    /// Seconds per tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}
