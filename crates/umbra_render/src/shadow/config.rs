//! Shadow Configuration
//!
//! Stencil shadow settings with serde support so hosts can load them from
//! disk alongside the rest of their configuration.

use serde::{Deserialize, Serialize};

use crate::state::CompareFunction;

/// Highest overlay pass count accepted by [`ShadowConfig::validate`]
pub const MAX_OVERLAY_PASSES: u8 = 8;

/// How the mark pass applies per-face stencil operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkStrategy {
    /// One draw with separate front and back stencil ops
    #[default]
    SeparateFaces,
    /// Two draws, culling front faces then back faces
    CulledPasses,
}

/// Stencil shadow configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Distance silhouette vertices are pushed away from the light
    pub extrusion_depth: f32,

    /// Stencil value the host clears to each frame
    pub stencil_base: u8,

    /// Number of overlay darkening passes (1-8)
    pub overlay_passes: u8,

    /// Destination scale for pixels inside exactly one volume
    pub overlay_base_alpha: f32,

    /// Alpha reduction per additional enclosing volume
    pub overlay_alpha_step: f32,

    /// Depth comparison used while marking volumes
    pub volume_depth_compare: CompareFunction,

    pub mark_strategy: MarkStrategy,

    /// Lengths below this are treated as light/vertex coincidence
    pub degenerate_epsilon: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            extrusion_depth: 30.0,
            stencil_base: 128,
            overlay_passes: 3,
            overlay_base_alpha: 0.8,
            overlay_alpha_step: 0.1,
            volume_depth_compare: CompareFunction::LessEqual,
            mark_strategy: MarkStrategy::SeparateFaces,
            degenerate_epsilon: 1e-6,
        }
    }
}

impl ShadowConfig {
    /// Configuration for scenes larger than the default extrusion covers
    pub fn deep(extrusion_depth: f32) -> Self {
        let mut config = Self {
            extrusion_depth,
            ..Default::default()
        };
        config.validate();
        config
    }

    /// A single uniform darkening pass
    pub fn single_pass() -> Self {
        Self {
            overlay_passes: 1,
            overlay_alpha_step: 0.0,
            ..Default::default()
        }
    }

    /// Validate configuration and clamp values to valid ranges
    pub fn validate(&mut self) {
        let defaults = Self::default();
        if !(self.extrusion_depth.is_finite() && self.extrusion_depth > 0.0) {
            self.extrusion_depth = defaults.extrusion_depth;
        }
        self.overlay_passes = self.overlay_passes.clamp(1, MAX_OVERLAY_PASSES);
        // base + passes must stay representable in an 8-bit stencil
        self.stencil_base = self.stencil_base.min(u8::MAX - self.overlay_passes);
        self.overlay_base_alpha = clamp_unit(self.overlay_base_alpha, defaults.overlay_base_alpha);
        self.overlay_alpha_step = clamp_unit(self.overlay_alpha_step, defaults.overlay_alpha_step);
        if !(self.degenerate_epsilon.is_finite() && self.degenerate_epsilon > 0.0) {
            self.degenerate_epsilon = defaults.degenerate_epsilon;
        }
    }

    /// Alpha applied by overlay pass `k` (1-based), never increasing with `k`
    pub fn overlay_alpha(&self, pass: u8) -> f32 {
        let k = pass.max(1) - 1;
        (self.overlay_base_alpha - f32::from(k) * self.overlay_alpha_step).clamp(0.0, 1.0)
    }
}

fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShadowConfig::default();
        assert_eq!(config.extrusion_depth, 30.0);
        assert_eq!(config.stencil_base, 128);
        assert_eq!(config.overlay_passes, 3);
        assert_eq!(config.volume_depth_compare, CompareFunction::LessEqual);
        assert_eq!(config.mark_strategy, MarkStrategy::SeparateFaces);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = ShadowConfig {
            extrusion_depth: -4.0,
            stencil_base: 255,
            overlay_passes: 40,
            overlay_base_alpha: 1.5,
            overlay_alpha_step: f32::NAN,
            degenerate_epsilon: 0.0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.extrusion_depth, 30.0);
        assert_eq!(config.overlay_passes, MAX_OVERLAY_PASSES);
        assert_eq!(config.stencil_base, 255 - MAX_OVERLAY_PASSES);
        assert_eq!(config.overlay_base_alpha, 1.0);
        assert_eq!(config.overlay_alpha_step, 0.1);
        assert_eq!(config.degenerate_epsilon, 1e-6);
    }

    #[test]
    fn test_alpha_ladder_never_increases() {
        let config = ShadowConfig {
            overlay_passes: 8,
            overlay_base_alpha: 0.3,
            overlay_alpha_step: 0.1,
            ..Default::default()
        };
        let ladder: Vec<f32> = (1..=config.overlay_passes).map(|k| config.overlay_alpha(k)).collect();
        assert!(ladder.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(ladder[7], 0.0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(ShadowConfig::deep(80.0).extrusion_depth, 80.0);
        assert_eq!(ShadowConfig::deep(-1.0).extrusion_depth, 30.0);
        let single = ShadowConfig::single_pass();
        assert_eq!(single.overlay_passes, 1);
        assert_eq!(single.overlay_alpha(1), 0.8);
    }

    #[test]
    fn test_serde_partial_document() {
        let config: ShadowConfig =
            serde_json::from_str(r#"{ "extrusion_depth": 50.0, "mark_strategy": "culled_passes" }"#).unwrap();
        assert_eq!(config.extrusion_depth, 50.0);
        assert_eq!(config.mark_strategy, MarkStrategy::CulledPasses);
        assert_eq!(config.stencil_base, 128);

        let json = serde_json::to_string(&config).unwrap();
        let back: ShadowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
