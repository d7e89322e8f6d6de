//! Animation core for the Grimoire front-end.
//!
//! Decorative effects (particle layers, cursor trails, sparkles) ask the
//! [`profiler`] how many units the device can afford, then register one
//! per-frame callback each with a [`FrameScheduler`]. The scheduler drives
//! all of them from a single frame request.
//!
//! The core is host-agnostic; `web` (wasm32 only) supplies the
//! `requestAnimationFrame` clock, the navigator-backed environment and the
//! JS exports.

pub mod clock;
pub mod constants;
pub mod profiler;
pub mod scheduler;
pub mod throttle;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{ClockError, FrameCallback, FrameClock, FrameRequestId, ManualClock};
pub use profiler::{
    detect_device_capabilities, performance_config, prefers_reduced_motion, ConnectionType,
    DeviceCapabilities, EffectCategory, Environment, HardwareThresholds, PerformanceConfig,
    PerformanceConfigCache, PerformanceTier, QualityTier, StaticEnvironment, TierPolicy,
};
pub use scheduler::{unique_key, FrameScheduler, Registration};
pub use throttle::{Debounce, Throttle};
