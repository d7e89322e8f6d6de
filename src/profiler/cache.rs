use super::capabilities::Environment;
use super::config::{PerformanceConfig, TierPolicy};
use std::cell::Cell;

/// Session-wide memo of the [`PerformanceConfig`].
///
/// Every effect mounted during a session sees the same snapshot, even if a
/// signal such as the network type changes in between. Call
/// [`reset`](Self::reset) when preferences change.
#[derive(Debug)]
pub struct PerformanceConfigCache<E: Environment> {
    env: E,
    policy: TierPolicy,
    cached: Cell<Option<PerformanceConfig>>,
}

impl<E: Environment> PerformanceConfigCache<E> {
    pub fn new(env: E) -> Self {
        Self::with_policy(env, TierPolicy::default())
    }

    pub fn with_policy(env: E, policy: TierPolicy) -> Self {
        Self {
            env,
            policy,
            cached: Cell::new(None),
        }
    }

    pub fn get(&self) -> PerformanceConfig {
        if let Some(config) = self.cached.get() {
            return config;
        }
        let caps = self.policy.detect(&self.env);
        let config = self
            .policy
            .config_for(&caps, self.env.prefers_reduced_motion());
        log::info!(
            "performance profile: {:?} (cores={} memory={}GB mobile={} connection={:?})",
            config.tier,
            caps.cores,
            caps.memory_gb,
            caps.is_mobile || caps.is_tablet,
            caps.connection
        );
        self.cached.set(Some(config));
        config
    }

    pub fn reset(&self) {
        if self.cached.take().is_some() {
            log::debug!("performance profile reset");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.get().is_some()
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }
}
