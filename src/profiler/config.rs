//! Tier selection and the per-tier animation budgets.

use super::capabilities::{DeviceCapabilities, Environment, HardwareThresholds};
use crate::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

/// Device/preference class, in ascending order of animation budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
    ReducedMotion,
    LowEnd,
    Mobile,
    MidRange,
    HighEnd,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 5] = [
        Self::ReducedMotion,
        Self::LowEnd,
        Self::Mobile,
        Self::MidRange,
        Self::HighEnd,
    ];
}

/// Categories of decorative effect that size themselves from the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectCategory {
    AmbientParticles,
    CursorTrail,
    DecorativeIcons,
    Sparkles,
}

/// Snapshot of how much animation work the session may host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub tier: PerformanceTier,

    pub ambient_particles: u32,
    pub cursor_trail: u32,
    pub decorative_icons: u32,
    pub sparkles: u32,

    pub complex_animations: bool,
    pub blur: bool,
    pub shadows: bool,
    pub particles: bool,

    /// Minimum spacing between non-frame-locked updates; 0 means every frame.
    pub throttle_ms: f64,
    pub debounce_ms: f64,

    pub image_quality: QualityTier,
    pub animation_quality: QualityTier,
}

impl PerformanceConfig {
    /// Built-in preset for `tier`.
    pub fn preset(tier: PerformanceTier) -> Self {
        let (units, flags, throttle_ms, debounce_ms, quality) = match tier {
            PerformanceTier::ReducedMotion => (
                REDUCED_MOTION_UNITS,
                [false; 4],
                REDUCED_MOTION_THROTTLE_MS,
                REDUCED_MOTION_DEBOUNCE_MS,
                QualityTier::Low,
            ),
            PerformanceTier::LowEnd => (
                LOW_END_UNITS,
                [false, false, false, true],
                LOW_END_THROTTLE_MS,
                LOW_END_DEBOUNCE_MS,
                QualityTier::Low,
            ),
            PerformanceTier::Mobile => (
                MOBILE_UNITS,
                [true, true, false, true],
                MOBILE_THROTTLE_MS,
                MOBILE_DEBOUNCE_MS,
                QualityTier::Medium,
            ),
            PerformanceTier::MidRange => (
                MID_RANGE_UNITS,
                [true; 4],
                MID_RANGE_THROTTLE_MS,
                MID_RANGE_DEBOUNCE_MS,
                QualityTier::High,
            ),
            PerformanceTier::HighEnd => (
                HIGH_END_UNITS,
                [true; 4],
                HIGH_END_THROTTLE_MS,
                HIGH_END_DEBOUNCE_MS,
                QualityTier::High,
            ),
        };
        let [complex_animations, blur, shadows, particles] = flags;
        let [ambient_particles, cursor_trail, decorative_icons, sparkles] = units;
        Self {
            tier,
            ambient_particles,
            cursor_trail,
            decorative_icons,
            sparkles,
            complex_animations,
            blur,
            shadows,
            particles,
            throttle_ms,
            debounce_ms,
            image_quality: quality,
            animation_quality: quality,
        }
    }

    pub fn units(&self, category: EffectCategory) -> u32 {
        match category {
            EffectCategory::AmbientParticles => self.ambient_particles,
            EffectCategory::CursorTrail => self.cursor_trail,
            EffectCategory::DecorativeIcons => self.decorative_icons,
            EffectCategory::Sparkles => self.sparkles,
        }
    }

    /// Clamps a component's requested unit count to the budget. Particle-like
    /// categories get nothing when particles are disabled.
    pub fn budget(&self, category: EffectCategory, requested: u32) -> u32 {
        let particle_like = matches!(
            category,
            EffectCategory::AmbientParticles | EffectCategory::Sparkles
        );
        if particle_like && !self.particles {
            return 0;
        }
        requested.min(self.units(category))
    }

    /// True when updates may run on every frame.
    pub fn is_frame_locked(&self) -> bool {
        self.throttle_ms <= 0.0
    }
}

/// Classification thresholds plus the config handed out for each tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPolicy {
    pub thresholds: HardwareThresholds,
    pub reduced_motion: PerformanceConfig,
    pub low_end: PerformanceConfig,
    pub mobile: PerformanceConfig,
    pub mid_range: PerformanceConfig,
    pub high_end: PerformanceConfig,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            thresholds: HardwareThresholds::default(),
            reduced_motion: PerformanceConfig::preset(PerformanceTier::ReducedMotion),
            low_end: PerformanceConfig::preset(PerformanceTier::LowEnd),
            mobile: PerformanceConfig::preset(PerformanceTier::Mobile),
            mid_range: PerformanceConfig::preset(PerformanceTier::MidRange),
            high_end: PerformanceConfig::preset(PerformanceTier::HighEnd),
        }
    }
}

impl TierPolicy {
    pub fn detect<E: Environment>(&self, env: &E) -> DeviceCapabilities {
        self.thresholds.classify(env)
    }

    /// First matching tier wins; reduced motion overrides everything.
    pub fn tier_for(&self, caps: &DeviceCapabilities, reduced_motion: bool) -> PerformanceTier {
        if reduced_motion {
            PerformanceTier::ReducedMotion
        } else if caps.is_low_end || caps.is_slow_connection {
            PerformanceTier::LowEnd
        } else if caps.is_mobile || caps.is_tablet {
            PerformanceTier::Mobile
        } else if caps.is_mid_range {
            PerformanceTier::MidRange
        } else {
            PerformanceTier::HighEnd
        }
    }

    pub fn config(&self, tier: PerformanceTier) -> PerformanceConfig {
        let mut config = match tier {
            PerformanceTier::ReducedMotion => self.reduced_motion,
            PerformanceTier::LowEnd => self.low_end,
            PerformanceTier::Mobile => self.mobile,
            PerformanceTier::MidRange => self.mid_range,
            PerformanceTier::HighEnd => self.high_end,
        };
        config.tier = tier;
        config
    }

    pub fn config_for(&self, caps: &DeviceCapabilities, reduced_motion: bool) -> PerformanceConfig {
        self.config(self.tier_for(caps, reduced_motion))
    }

    pub fn performance_config<E: Environment>(&self, env: &E) -> PerformanceConfig {
        let caps = self.detect(env);
        self.config_for(&caps, env.prefers_reduced_motion())
    }
}

/// Computes a fresh config with the default policy. Prefer
/// [`PerformanceConfigCache`](super::PerformanceConfigCache) in UI code.
pub fn performance_config<E: Environment>(env: &E) -> PerformanceConfig {
    TierPolicy::default().performance_config(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_grow_with_tier() {
        let categories = [
            EffectCategory::AmbientParticles,
            EffectCategory::CursorTrail,
            EffectCategory::DecorativeIcons,
            EffectCategory::Sparkles,
        ];
        for pair in PerformanceTier::ALL.windows(2) {
            let lo = PerformanceConfig::preset(pair[0]);
            let hi = PerformanceConfig::preset(pair[1]);
            for c in categories {
                assert!(lo.units(c) <= hi.units(c), "{c:?} shrinks from {:?}", pair[0]);
            }
            assert!(lo.throttle_ms >= hi.throttle_ms);
            assert!(lo.image_quality <= hi.image_quality);
        }
    }

    #[test]
    fn budget_respects_particle_flag() {
        let mut cfg = PerformanceConfig::preset(PerformanceTier::MidRange);
        assert_eq!(cfg.budget(EffectCategory::Sparkles, 100), cfg.sparkles);
        assert_eq!(cfg.budget(EffectCategory::CursorTrail, 2), 2);
        cfg.particles = false;
        assert_eq!(cfg.budget(EffectCategory::Sparkles, 3), 0);
        assert_eq!(cfg.budget(EffectCategory::CursorTrail, 2), 2);
    }

    #[test]
    fn serializes_camel_case() {
        let cfg = PerformanceConfig::preset(PerformanceTier::Mobile);
        let json = serde_json::to_value(cfg).unwrap();
        assert_eq!(json["tier"], "mobile");
        assert_eq!(json["ambientParticles"], 10);
        assert_eq!(json["imageQuality"], "medium");
        assert_eq!(json["shadows"], false);
    }
}
