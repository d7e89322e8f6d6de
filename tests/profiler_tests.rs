// Host-side tests for tier selection and the session config cache, using
// fixed environment signals.

use grimoire_motion::{
    detect_device_capabilities, performance_config, EffectCategory, Environment,
    PerformanceConfigCache, PerformanceTier, QualityTier, StaticEnvironment, TierPolicy,
};
use std::cell::{Cell, RefCell};

const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15";

const ALL_CATEGORIES: [EffectCategory; 4] = [
    EffectCategory::AmbientParticles,
    EffectCategory::CursorTrail,
    EffectCategory::DecorativeIcons,
    EffectCategory::Sparkles,
];

#[test]
fn reduced_motion_wins_over_high_end_hardware() {
    let env = StaticEnvironment::desktop(16, 32.0).with_reduced_motion(true);
    let cfg = performance_config(&env);

    assert_eq!(cfg.tier, PerformanceTier::ReducedMotion);
    for c in ALL_CATEGORIES {
        assert_eq!(cfg.units(c), 0, "{c:?}");
    }
    assert!(!cfg.complex_animations);
    assert!(!cfg.blur);
    assert!(!cfg.shadows);
    assert!(!cfg.particles);
    assert_eq!(cfg.image_quality, QualityTier::Low);
    assert_eq!(cfg.animation_quality, QualityTier::Low);
}

#[test]
fn four_cores_four_gb_is_mid_range() {
    let env = StaticEnvironment::desktop(4, 4.0);
    let caps = detect_device_capabilities(&env);
    assert!(caps.is_mid_range);
    assert!(!caps.is_low_end);
    assert!(!caps.is_high_end);
    assert_eq!(performance_config(&env).tier, PerformanceTier::MidRange);
}

#[test]
fn low_end_when_either_resource_is_short() {
    for env in [
        StaticEnvironment::desktop(2, 16.0),
        StaticEnvironment::desktop(16, 2.0),
    ] {
        let cfg = performance_config(&env);
        assert_eq!(cfg.tier, PerformanceTier::LowEnd);
        assert!(!cfg.complex_animations);
        assert!(!cfg.blur);
        assert!(!cfg.shadows);
        assert!(cfg.particles);
        assert!(cfg.ambient_particles > 0);
    }
}

#[test]
fn slow_network_demotes_high_end_device() {
    let env = StaticEnvironment::desktop(16, 32.0).with_connection("2g");
    assert!(detect_device_capabilities(&env).is_slow_connection);
    assert_eq!(performance_config(&env).tier, PerformanceTier::LowEnd);

    let env = StaticEnvironment::desktop(16, 32.0).with_connection("3g");
    assert_eq!(performance_config(&env).tier, PerformanceTier::HighEnd);
}

#[test]
fn mobile_and_tablet_share_a_tier() {
    for ua in [IPHONE_UA, IPAD_UA] {
        let env = StaticEnvironment::desktop(8, 8.0).with_user_agent(ua);
        let cfg = performance_config(&env);
        assert_eq!(cfg.tier, PerformanceTier::Mobile, "{ua}");
        assert!(cfg.complex_animations);
        assert!(cfg.blur);
        assert!(!cfg.shadows);
        assert_eq!(cfg.image_quality, QualityTier::Medium);
    }
}

#[test]
fn low_end_mobile_is_low_end() {
    let env = StaticEnvironment::desktop(2, 2.0).with_user_agent(IPHONE_UA);
    assert_eq!(performance_config(&env).tier, PerformanceTier::LowEnd);
}

#[test]
fn high_end_desktop_is_frame_locked() {
    let cfg = performance_config(&StaticEnvironment::desktop(8, 8.0));
    assert_eq!(cfg.tier, PerformanceTier::HighEnd);
    assert!(cfg.is_frame_locked());
    assert!(cfg.shadows);
    assert_eq!(cfg.image_quality, QualityTier::High);
}

#[test]
fn unclassified_desktop_falls_through_to_high_end() {
    // Many cores but mid-range memory is neither mid-range nor high-end.
    let env = StaticEnvironment::desktop(16, 6.0);
    let caps = detect_device_capabilities(&env);
    assert!(!caps.is_low_end && !caps.is_mid_range && !caps.is_high_end);
    assert_eq!(performance_config(&env).tier, PerformanceTier::HighEnd);
}

#[test]
fn custom_thresholds_change_classification() {
    let mut policy = TierPolicy::default();
    policy.thresholds.mid_cores = 2;
    policy.thresholds.mid_memory_gb = 2.0;
    let env = StaticEnvironment::desktop(2, 2.0);
    assert_eq!(policy.performance_config(&env).tier, PerformanceTier::MidRange);
}

#[test]
fn policy_overrides_load_from_json() {
    let mut json = serde_json::to_value(TierPolicy::default()).unwrap();
    json["highEnd"]["sparkles"] = serde_json::json!(40);
    let policy: TierPolicy = serde_json::from_value(json).unwrap();
    let cfg = policy.performance_config(&StaticEnvironment::desktop(8, 8.0));
    assert_eq!(cfg.sparkles, 40);
}

/// Environment whose signals can change between calls and which counts
/// how often it is probed.
struct ProbeEnvironment {
    signals: RefCell<StaticEnvironment>,
    probes: Cell<u32>,
}

impl Environment for ProbeEnvironment {
    fn user_agent(&self) -> String {
        self.probes.set(self.probes.get() + 1);
        self.signals.borrow().user_agent()
    }
    fn logical_cores(&self) -> Option<u32> {
        self.signals.borrow().logical_cores()
    }
    fn device_memory_gb(&self) -> Option<f64> {
        self.signals.borrow().device_memory_gb()
    }
    fn effective_connection_type(&self) -> Option<String> {
        self.signals.borrow().effective_connection_type()
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.signals.borrow().prefers_reduced_motion()
    }
}

#[test]
fn cache_is_stable_until_reset() {
    let cache = PerformanceConfigCache::new(ProbeEnvironment {
        signals: RefCell::new(StaticEnvironment::desktop(8, 8.0)),
        probes: Cell::new(0),
    });
    assert!(!cache.is_cached());

    let first = cache.get();
    // A transient signal change must not leak into the cached profile.
    cache.environment().signals.borrow_mut().effective_type = Some("slow-2g".into());
    let second = cache.get();
    assert_eq!(first, second);
    assert_eq!(first.tier, PerformanceTier::HighEnd);
    assert_eq!(cache.environment().probes.get(), 1);

    cache.reset();
    assert!(!cache.is_cached());
    let third = cache.get();
    assert_eq!(cache.environment().probes.get(), 2);
    assert_eq!(third.tier, PerformanceTier::LowEnd);
}

#[test]
fn reset_picks_up_reduced_motion_toggle() {
    let cache = PerformanceConfigCache::new(ProbeEnvironment {
        signals: RefCell::new(StaticEnvironment::desktop(4, 4.0)),
        probes: Cell::new(0),
    });
    assert_eq!(cache.get().tier, PerformanceTier::MidRange);
    cache.environment().signals.borrow_mut().reduced_motion = true;
    assert_eq!(cache.get().tier, PerformanceTier::MidRange);
    cache.reset();
    assert_eq!(cache.get().tier, PerformanceTier::ReducedMotion);
}
